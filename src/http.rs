//! Transport primitives the interceptor dispatches through.
//!
//! The module exposes [`RequestTransport`] alongside [`PreparedRequest`] and [`Response`] so
//! downstream crates can plug in their own HTTP stack. Transports report non-2xx responses as
//! [`Error::Status`] and network failures as [`Error::Transport`]; returning `None` from
//! [`RequestTransport::call`] means no call could be constructed, which the interceptor turns
//! into a synthetic 404.

// crates.io
use ::http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
#[cfg(feature = "reqwest")] use ::http::StatusCode;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")] use crate::error::{ConfigError, TransportError};

/// Boxed future returned by [`RequestTransport::call`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + 'a + Send>>;

/// Abstraction over HTTP transports that execute prepared requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back many interceptor
/// clones. Timeouts belong to the transport; the interceptor never imposes one.
pub trait RequestTransport
where
	Self: 'static + Send + Sync,
{
	/// Starts the call for `request`, or returns `None` if it cannot be constructed.
	fn call(&self, request: PreparedRequest) -> Option<TransportFuture<'_>>;
}

/// Fully prepared request handed to a [`RequestTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
	/// Wire method.
	pub method: Method,
	/// Target URL as issued by the caller.
	pub url: String,
	/// Final header map, including the interceptor-managed headers.
	pub headers: HeaderMap,
	/// Body bytes, if any.
	pub body: Option<Vec<u8>>,
}

/// Successful HTTP response.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase for the status.
	pub status_text: String,
	/// URL the response was served for.
	pub url: String,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw payload.
	pub body: Vec<u8>,
}
impl Response {
	/// Builds a response with empty headers and the canonical reason phrase.
	pub fn new(status: u16, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			status_text: StatusFailure::new(status, None).status_text.into_owned(),
			url: url.into(),
			headers: HeaderMap::new(),
			body: body.into(),
		}
	}

	/// Decodes the payload as JSON.
	pub fn json<T>(&self) -> serde_json::Result<T>
	where
		T: DeserializeOwned,
	{
		serde_json::from_slice(&self.body)
	}

	/// Returns the payload as UTF-8 text, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// [`RequestTransport`] backed by a [`ReqwestClient`].
///
/// Relative targets such as `/assets/token.json` are joined onto the configured base URL;
/// targets that do not resolve to an absolute URL cannot be constructed.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	base_url: Option<Url>,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, base_url: None }
	}

	/// Builds a transport with a default client that resolves relative targets against
	/// `base_url`.
	pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Self::with_client(client).base_url(base_url)
	}

	/// Sets the base URL for relative targets.
	pub fn base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
		let parsed = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		self.base_url = Some(parsed);

		Ok(self)
	}

	/// Resolves `target` into an absolute URL.
	pub fn resolve(&self, target: &str) -> Option<Url> {
		match &self.base_url {
			Some(base) => base.join(target).ok(),
			None => Url::parse(target).ok(),
		}
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl RequestTransport for ReqwestTransport {
	fn call(&self, request: PreparedRequest) -> Option<TransportFuture<'_>> {
		let target = self.resolve(&request.url)?;
		let PreparedRequest { method, url, headers, body } = request;
		let mut builder = self.client.request(method, target).headers(headers);

		if let Some(body) = body {
			builder = builder.body(body);
		}

		Some(Box::pin(execute(builder, url)))
	}
}

#[cfg(feature = "reqwest")]
async fn execute(builder: reqwest::RequestBuilder, url: String) -> Result<Response> {
	let response = builder.send().await.map_err(|e| TransportError::network(url.as_str(), e))?;
	let status = response.status();
	let headers = response.headers().to_owned();
	let payload = response.bytes().await.map_err(|e| TransportError::network(url.as_str(), e))?;

	if !status.is_success() {
		return Err(status_failure(status, url).into());
	}

	Ok(Response {
		status: status.as_u16(),
		status_text: status.canonical_reason().unwrap_or_default().to_owned(),
		url,
		headers,
		body: payload.to_vec(),
	})
}

#[cfg(feature = "reqwest")]
fn status_failure(status: StatusCode, url: String) -> StatusFailure {
	StatusFailure::new(status.as_u16(), Some(url))
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[test]
	fn relative_targets_join_base_url() {
		let transport = ReqwestTransport::default()
			.base_url("http://127.0.0.1:8080/app/")
			.expect("Base URL fixture should parse.");

		assert_eq!(
			transport.resolve("/assets/token.json").map(String::from),
			Some("http://127.0.0.1:8080/assets/token.json".to_owned())
		);
		assert_eq!(
			transport.resolve("todo").map(String::from),
			Some("http://127.0.0.1:8080/app/todo".to_owned())
		);
	}

	#[test]
	fn relative_target_without_base_cannot_be_constructed() {
		let transport = ReqwestTransport::default();
		let request = PreparedRequest {
			method: Method::GET,
			url: "/assets/token.json".into(),
			headers: HeaderMap::new(),
			body: None,
		};

		assert!(transport.call(request).is_none());
	}

	#[test]
	fn invalid_base_url_is_rejected() {
		let err = ReqwestTransport::default()
			.base_url("not a url")
			.expect_err("Base URL without a scheme must be rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
	}
}
