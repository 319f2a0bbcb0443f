//! Thread-safe in-memory [`TokenStore`] implementation for applications and tests.

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenAction, TokenSecret},
	store::{StoreFuture, TokenStore},
};

type CredentialCell = Arc<RwLock<Credential>>;

/// Thread-safe storage backend that keeps the credential in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(CredentialCell);
impl MemoryTokenStore {
	/// Creates a store seeded with `credential`.
	pub fn with_credential(credential: Credential) -> Self {
		Self(Arc::new(RwLock::new(credential)))
	}

	/// Returns the current credential without going through the async contract.
	pub fn snapshot(&self) -> Credential {
		self.0.read().clone()
	}

	fn apply_now(cell: &CredentialCell, action: TokenAction) {
		let mut guard = cell.write();
		let current = std::mem::take(&mut *guard);

		*guard = current.reduce(action);
	}
}
impl TokenStore for MemoryTokenStore {
	fn credential(&self) -> StoreFuture<'_, Credential> {
		let cell = self.0.clone();

		Box::pin(async move { Ok(cell.read().clone()) })
	}

	fn set_credential(&self, token: TokenSecret) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::apply_now(&cell, TokenAction::Received(token));

			Ok(())
		})
	}

	fn mark_needed(&self) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::apply_now(&cell, TokenAction::Needed);

			Ok(())
		})
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		let cell = self.0.clone();

		Box::pin(async move {
			Self::apply_now(&cell, TokenAction::Cleared);

			Ok(())
		})
	}
}
