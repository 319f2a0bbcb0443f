//! Request verbs, per-call options, and the immutable descriptors replayed on recovery.

// crates.io
use ::http::{HeaderMap, HeaderName, HeaderValue, Method};
// self
use crate::_prelude::*;

/// Interceptor entry point used to issue a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
	/// `GET`; read-only fetch.
	Get,
	/// `POST`; carries a body.
	Post,
	/// `PUT`; carries a body.
	Put,
	/// `PATCH`; carries a body.
	Patch,
	/// `DELETE`.
	Delete,
	/// `HEAD`.
	Head,
	/// `OPTIONS`.
	Options,
	/// Generic dispatch of a pre-built descriptor that names its own method.
	Request,
}
impl Verb {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verb::Get => "get",
			Verb::Post => "post",
			Verb::Put => "put",
			Verb::Patch => "patch",
			Verb::Delete => "delete",
			Verb::Head => "head",
			Verb::Options => "options",
			Verb::Request => "request",
		}
	}

	/// Wire method implied by the verb; `None` for [`Verb::Request`].
	pub fn method(self) -> Option<Method> {
		match self {
			Verb::Get => Some(Method::GET),
			Verb::Post => Some(Method::POST),
			Verb::Put => Some(Method::PUT),
			Verb::Patch => Some(Method::PATCH),
			Verb::Delete => Some(Method::DELETE),
			Verb::Head => Some(Method::HEAD),
			Verb::Options => Some(Method::OPTIONS),
			Verb::Request => None,
		}
	}

	/// Returns `true` for verbs whose entry point takes a body.
	pub const fn carries_body(self) -> bool {
		matches!(self, Verb::Post | Verb::Put | Verb::Patch)
	}
}
impl Display for Verb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Per-call options merged into every attempt of a request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
	/// Extra headers sent alongside the interceptor-managed ones.
	pub headers: HeaderMap,
}
impl RequestOptions {
	/// Adds a header, replacing any previous value with the same name.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}
}

/// Immutable description of a request; recovery replays it verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
	/// Entry point used to issue the request.
	pub verb: Verb,
	/// Wire method.
	pub method: Method,
	/// Target URL, absolute or relative to the transport's base.
	pub url: String,
	/// Raw body bytes, if any.
	pub body: Option<Vec<u8>>,
	/// Caller-supplied options.
	pub options: RequestOptions,
}
impl RequestDescriptor {
	/// Builds a generic descriptor dispatched through [`Verb::Request`].
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			verb: Verb::Request,
			method,
			url: url.into(),
			body: None,
			options: RequestOptions::default(),
		}
	}

	/// Builds a descriptor for a concrete verb. [`Verb::Request`] falls back to `GET`.
	pub fn for_verb(verb: Verb, url: impl Into<String>) -> Self {
		Self {
			verb,
			method: verb.method().unwrap_or(Method::GET),
			url: url.into(),
			body: None,
			options: RequestOptions::default(),
		}
	}

	/// Attaches a body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Replaces the caller options.
	pub fn with_options(mut self, options: RequestOptions) -> Self {
		self.options = options;

		self
	}
}
