// self
use crate::{obs::ExchangeOutcome, request::Verb};

/// Records an exchange outcome via the global metrics recorder (when enabled).
pub fn record_exchange_outcome(verb: Verb, outcome: ExchangeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bearer_interceptor_exchange_total",
			"verb" => verb.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (verb, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_exchange_outcome_noop_without_recorder() {
		record_exchange_outcome(Verb::Get, ExchangeOutcome::Failure);
	}
}
