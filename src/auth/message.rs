//! Token message served by the refresh endpoint.

// self
use crate::{_prelude::*, auth::TokenSecret, error::TokenMessageError};

/// JSON payload `{ "token": "<value>" }` returned by the refresh endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMessage {
	/// Newly issued bearer token.
	pub token: TokenSecret,
}
impl TokenMessage {
	/// Decodes a token message, reporting the JSON path of the first mismatch.
	pub fn from_slice(url: &str, payload: &[u8]) -> Result<Self, TokenMessageError> {
		let deserializer = &mut serde_json::Deserializer::from_slice(payload);

		serde_path_to_error::deserialize(deserializer)
			.map_err(|source| TokenMessageError { url: url.to_owned(), source })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn decodes_token_field() {
		let message = TokenMessage::from_slice("/assets/token.json", br#"{"token":"fresh"}"#)
			.expect("Token message fixture should decode.");

		assert_eq!(message.token.expose(), "fresh");
	}

	#[test]
	fn malformed_payload_reports_path() {
		let err = TokenMessage::from_slice("/assets/token.json", br#"{"token":42}"#)
			.expect_err("Numeric token must be rejected.");

		assert_eq!(err.source.path().to_string(), "token");
		assert!(err.to_string().contains("/assets/token.json"));
	}
}
