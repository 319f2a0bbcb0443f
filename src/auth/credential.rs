//! Credential state and the actions that move it between lifecycle stages.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Current bearer credential held by a token store.
///
/// `needed` marks that the store lacks a usable token and one must be fetched before use; a
/// stale `value` may still be present while it is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Token value, if one has been received.
	pub value: Option<TokenSecret>,
	/// Indicates that a fresh token must be fetched.
	pub needed: bool,
}
impl Credential {
	/// Builds a credential holding a freshly received token.
	pub fn received(token: TokenSecret) -> Self {
		Self { value: Some(token), needed: false }
	}

	/// Returns the token to attach to outgoing requests.
	///
	/// Yields `None` when the value is missing or empty, or while a refresh is needed.
	pub fn usable(&self) -> Option<&TokenSecret> {
		if self.needed {
			return None;
		}

		self.value.as_ref().filter(|token| !token.is_empty())
	}

	/// Applies `action` and returns the resulting credential.
	pub fn reduce(self, action: TokenAction) -> Self {
		match action {
			TokenAction::Received(token) => Self::received(token),
			TokenAction::Needed => Self { needed: true, ..self },
			TokenAction::Cleared => Self::default(),
		}
	}
}

/// State transitions accepted by token stores.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenAction {
	/// A new token arrived; clears the `needed` flag.
	Received(TokenSecret),
	/// The current token is unusable and must be refreshed.
	Needed,
	/// Drops the token and resets the store.
	Cleared,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn reducer_walks_lifecycle() {
		let initial = Credential::default();

		assert_eq!(initial.value, None);
		assert!(!initial.needed);

		let received = initial.reduce(TokenAction::Received(TokenSecret::new("abc")));

		assert_eq!(received.usable().map(TokenSecret::expose), Some("abc"));

		let needed = received.reduce(TokenAction::Needed);

		assert!(needed.needed);
		assert_eq!(needed.value.as_ref().map(TokenSecret::expose), Some("abc"));
		assert!(needed.usable().is_none(), "A needed credential must not be attached.");

		let refreshed = needed.reduce(TokenAction::Received(TokenSecret::new("def")));

		assert!(!refreshed.needed);
		assert_eq!(refreshed.usable().map(TokenSecret::expose), Some("def"));
		assert_eq!(refreshed.reduce(TokenAction::Cleared), Credential::default());
	}

	#[test]
	fn empty_token_is_not_usable() {
		let credential = Credential::received(TokenSecret::new(""));

		assert!(credential.usable().is_none());
	}
}
