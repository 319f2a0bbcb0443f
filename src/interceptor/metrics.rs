// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for 401 recovery cycles.
#[derive(Debug, Default)]
pub struct RecoveryMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	exhausted: AtomicU64,
}
impl RecoveryMetrics {
	/// Returns the number of recovery cycles started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of cycles that stored a fresh credential.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of cycles whose refresh failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how often a 401 arrived with the budget already spent.
	pub fn exhaustions(&self) -> u64 {
		self.exhausted.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failures(&self, count: usize) {
		self.failure.fetch_add(count as u64, Ordering::Relaxed);
	}

	pub(crate) fn record_exhausted(&self) {
		self.exhausted.fetch_add(1, Ordering::Relaxed);
	}
}
