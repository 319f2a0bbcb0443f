//! Optional observability helpers for intercepted exchanges.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to run every exchange inside a span named
//!   `bearer_interceptor.exchange` with the `verb` and `stage` fields, and to emit diagnostics for
//!   unrecovered failures.
//! - Enable `metrics` to increment the `bearer_interceptor_exchange_total` counter for every
//!   attempt/success/failure/recovery/exhaustion, labeled by `verb` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// A request was handed to the transport.
	Attempt,
	/// The exchange resolved successfully.
	Success,
	/// A failure propagated back to the caller.
	Failure,
	/// A 401 consumed one recovery attempt.
	Recovery,
	/// A 401 arrived after the recovery budget was spent.
	Exhausted,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::Failure => "failure",
			ExchangeOutcome::Recovery => "recovery",
			ExchangeOutcome::Exhausted => "exhausted",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
