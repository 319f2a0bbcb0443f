// std
use std::sync::atomic::{AtomicU32, Ordering};

/// Shared counter bounding how many 401 recoveries an interceptor performs.
///
/// The budget is not scoped to a single request: every exchange issued through the interceptors
/// sharing a budget draws from the same counter, so a burst of unrelated 401s spends it faster
/// than repeated failures of one request. The counter is not reset by successful recoveries;
/// it returns to zero only when a 401 arrives with the budget already spent.
#[derive(Debug)]
pub struct RecoveryBudget {
	used: AtomicU32,
	limit: u32,
}
impl RecoveryBudget {
	/// Default number of recoveries before a 401 is surfaced.
	pub const DEFAULT_LIMIT: u32 = 5;

	/// Creates a budget allowing `limit` recoveries.
	pub const fn new(limit: u32) -> Self {
		Self { used: AtomicU32::new(0), limit }
	}

	/// Consumes one recovery attempt.
	///
	/// Returns `false` and resets the counter to zero when the limit has been reached.
	pub fn try_consume(&self) -> bool {
		let mut current = self.used.load(Ordering::Acquire);

		loop {
			if current >= self.limit {
				self.used.store(0, Ordering::Release);

				return false;
			}

			match self.used.compare_exchange_weak(
				current,
				current + 1,
				Ordering::AcqRel,
				Ordering::Acquire,
			) {
				Ok(_) => return true,
				Err(actual) => current = actual,
			}
		}
	}

	/// Number of recoveries consumed since the last reset.
	pub fn used(&self) -> u32 {
		self.used.load(Ordering::Acquire)
	}

	/// Recoveries still available before the next 401 is surfaced.
	pub fn remaining(&self) -> u32 {
		self.limit.saturating_sub(self.used())
	}

	/// Configured limit.
	pub const fn limit(&self) -> u32 {
		self.limit
	}

	/// Clears the consumed count.
	pub fn reset(&self) {
		self.used.store(0, Ordering::Release);
	}
}
impl Default for RecoveryBudget {
	fn default() -> Self {
		Self::new(Self::DEFAULT_LIMIT)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{sync::Arc, thread};
	// self
	use super::*;

	#[test]
	fn exhaustion_resets_counter() {
		let budget = RecoveryBudget::new(2);

		assert!(budget.try_consume());
		assert!(budget.try_consume());
		assert_eq!(budget.remaining(), 0);
		assert!(!budget.try_consume(), "Third recovery must be refused.");
		assert_eq!(budget.used(), 0);
		assert!(budget.try_consume(), "Budget is available again after the reset.");
	}

	#[test]
	fn reset_restores_full_budget() {
		let budget = RecoveryBudget::new(3);

		assert!(budget.try_consume());
		assert!(budget.try_consume());
		assert_eq!(budget.remaining(), 1);

		budget.reset();

		assert_eq!(budget.used(), 0);
		assert_eq!(budget.remaining(), 3);
	}

	#[test]
	fn zero_limit_never_recovers() {
		let budget = RecoveryBudget::new(0);

		assert!(!budget.try_consume());
		assert_eq!(budget.used(), 0);
	}

	#[test]
	fn concurrent_consumers_never_overspend() {
		let budget = Arc::new(RecoveryBudget::new(64));
		let handles = (0..8)
			.map(|_| {
				let budget = Arc::clone(&budget);

				thread::spawn(move || (0..8).filter(|_| budget.try_consume()).count())
			})
			.collect::<Vec<_>>();
		let granted: usize = handles
			.into_iter()
			.map(|handle| handle.join().expect("Budget worker thread should not panic."))
			.sum();

		assert_eq!(granted, 64);
		assert_eq!(budget.used(), 64);
	}
}
