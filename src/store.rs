//! Credential storage contracts and built-in store implementations.

pub mod file;
pub mod memory;

pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenAction, TokenSecret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract consulted by the interceptor before every attempt.
///
/// Readers must tolerate a transient `needed` state: a refresh running on another request may
/// mark the credential as needed between two reads.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Returns a snapshot of the current credential.
	fn credential(&self) -> StoreFuture<'_, Credential>;

	/// Stores a freshly received token and clears the `needed` flag.
	fn set_credential(&self, token: TokenSecret) -> StoreFuture<'_, ()>;

	/// Flags the current token as unusable so a refresh can replace it.
	fn mark_needed(&self) -> StoreFuture<'_, ()>;

	/// Drops the token entirely.
	fn clear(&self) -> StoreFuture<'_, ()>;

	/// Routes a [`TokenAction`] to the matching operation.
	fn dispatch(&self, action: TokenAction) -> StoreFuture<'_, ()> {
		match action {
			TokenAction::Received(token) => self.set_credential(token),
			TokenAction::Needed => self.mark_needed(),
			TokenAction::Cleared => self.clear(),
		}
	}
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
