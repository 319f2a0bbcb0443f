//! Interceptor-level error types shared across transports, stores, and the recovery protocol.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Interceptor-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// The request resolved to an HTTP failure status.
	#[error(transparent)]
	Status(#[from] StatusFailure),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Refresh endpoint returned a payload that is not a token message.
	#[error(transparent)]
	TokenMessage(#[from] TokenMessageError),
	/// Token store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Stored token cannot be encoded as an `Authorization` header value.
	#[error("Stored credential is not a valid header value.")]
	InvalidCredential,
}
impl Error {
	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status(failure) => Some(failure.status),
			_ => None,
		}
	}

	/// Returns `true` when the error is an HTTP 401 failure.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Status(failure) if failure.is_unauthorized())
	}
}

/// HTTP failure outcome carrying the status code, status text, and target URL.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("HTTP {status} {status_text} for {}.", .url.as_deref().unwrap_or("<no url>"))]
pub struct StatusFailure {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase associated with the status.
	pub status_text: Cow<'static, str>,
	/// Target URL, when one was known.
	pub url: Option<String>,
}
impl StatusFailure {
	/// Status code that triggers credential recovery.
	pub const UNAUTHORIZED: u16 = 401;

	/// Builds a failure using the canonical reason phrase for `status`.
	pub fn new(status: u16, url: Option<String>) -> Self {
		let status_text = ::http::StatusCode::from_u16(status)
			.ok()
			.and_then(|code| code.canonical_reason())
			.unwrap_or("Unknown Status");

		Self { status, status_text: Cow::Borrowed(status_text), url }
	}

	/// Overrides the reason phrase reported by the upstream server.
	pub fn with_status_text(mut self, text: impl Into<Cow<'static, str>>) -> Self {
		self.status_text = text.into();

		self
	}

	/// Synthetic failure used when no transport call could be constructed.
	pub fn not_found(url: Option<String>) -> Self {
		Self { status: 404, status_text: Cow::Borrowed("Not Found"), url }
	}

	/// Returns `true` for HTTP 401.
	pub fn is_unauthorized(&self) -> bool {
		self.status == Self::UNAUTHORIZED
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Transport base URL cannot be parsed.
	#[error("Transport base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Refresh endpoint was configured as an empty string.
	#[error("Refresh endpoint cannot be empty.")]
	EmptyRefreshEndpoint,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL of the failed call.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(url: impl Into<String>, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

/// Refresh payload could not be decoded into a token message.
#[derive(Debug, ThisError)]
#[error("Refresh endpoint {url} returned a malformed token message at `{}`.", .source.path())]
pub struct TokenMessageError {
	/// Refresh endpoint that served the payload.
	pub url: String,
	/// Structured parsing failure.
	#[source]
	pub source: serde_path_to_error::Error<serde_json::Error>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn not_found_embeds_target_url() {
		let failure = StatusFailure::not_found(Some("/missing".into()));

		assert_eq!(failure.status, 404);
		assert_eq!(failure.status_text, "Not Found");
		assert!(failure.to_string().contains("/missing"));
		assert!(StatusFailure::not_found(None).to_string().contains("<no url>"));
	}

	#[test]
	fn status_text_uses_canonical_reason() {
		assert_eq!(StatusFailure::new(401, None).status_text, "Unauthorized");
		assert_eq!(StatusFailure::new(599, None).status_text, "Unknown Status");
		assert!(Error::from(StatusFailure::new(401, None)).is_unauthorized());
		assert!(!Error::from(StatusFailure::new(500, None)).is_unauthorized());
	}

	#[test]
	fn upstream_status_text_overrides_canonical_reason() {
		let failure =
			StatusFailure::new(401, Some("/x".into())).with_status_text("Token Expired");

		assert_eq!(failure.status_text, "Token Expired");
		assert!(failure.is_unauthorized());
		assert_eq!(failure.to_string(), "HTTP 401 Token Expired for /x.");
	}

	#[test]
	fn store_error_converts_into_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk unavailable"));

		let source =
			StdError::source(&error).expect("Error should expose the original store error.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
