// self
use crate::{_prelude::*, request::Verb};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedExchange<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedExchange<F> = F;

/// A span builder used by intercepted exchanges.
#[derive(Clone, Debug)]
pub struct ExchangeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ExchangeSpan {
	/// Creates a new span tagged with the provided verb + stage.
	pub fn new(verb: Verb, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("bearer_interceptor.exchange", verb = verb.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (verb, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedExchange<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits the diagnostic for a failure the interceptor does not recover from.
pub fn report_unrecovered(verb: Verb, url: &str, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		match error {
			Error::Status(failure) => tracing::error!(
				status = failure.status,
				status_text = %failure.status_text,
				verb = verb.as_str(),
				url,
				"request failed"
			),
			other => tracing::error!(verb = verb.as_str(), url, error = %other, "request failed"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verb, url, error);
	}
}

/// Emits the event for a 401 that starts a recovery cycle.
pub fn report_recovery(verb: Verb, url: &str, used: u32, limit: u32) {
	#[cfg(feature = "tracing")]
	tracing::warn!(verb = verb.as_str(), url, used, limit, "unauthorized; refreshing credential");
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verb, url, used, limit);
	}
}

/// Emits the event for a 401 that arrives once the budget is spent.
pub fn report_exhausted(verb: Verb, url: &str, limit: u32) {
	#[cfg(feature = "tracing")]
	tracing::warn!(verb = verb.as_str(), url, limit, "unauthorized; recovery budget exhausted");
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (verb, url, limit);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = ExchangeSpan::new(Verb::Get, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn reporters_accept_every_error_shape() {
		let failure = Error::Status(StatusFailure::new(500, Some("/x".into())));

		report_unrecovered(Verb::Post, "/x", &failure);
		report_recovery(Verb::Get, "/x", 1, 5);
		report_exhausted(Verb::Get, "/x", 5);
	}
}
