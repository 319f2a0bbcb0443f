//! Bearer-token request interceptor: attach credentials to every outgoing request, refresh them
//! on HTTP 401 within a shared retry budget, and pass every other outcome straight through.
//!
//! The crate is organized around two collaborator contracts and the interceptor that composes
//! them:
//!
//! - [`store::TokenStore`] holds the current [`auth::Credential`].
//! - [`http::RequestTransport`] performs the network call for a [`http::PreparedRequest`].
//! - [`interceptor::Interceptor`] runs the recovery protocol on top of both.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod obs;
pub mod request;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Credential, TokenSecret},
		http::{PreparedRequest, RequestTransport, Response, TransportFuture},
		interceptor::Interceptor,
		store::{MemoryTokenStore, TokenStore},
	};

	/// Scripted answer returned by [`ScriptedTransport`] for a single call.
	#[derive(Clone, Debug)]
	pub enum ScriptedReply {
		/// Resolves to a 200 response with the provided payload.
		Ok(Vec<u8>),
		/// Resolves to a status failure with the provided code.
		Status(u16),
		/// The transport refuses to construct the call.
		Unconstructible,
	}

	/// In-process transport that answers from per-URL scripts and records every request.
	///
	/// Each URL owns a queue of replies; the last reply of a queue repeats forever once the
	/// queue drains to a single entry.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedTransport {
		scripts: Arc<Mutex<HashMap<String, Vec<ScriptedReply>>>>,
		requests: Arc<Mutex<Vec<PreparedRequest>>>,
	}
	impl ScriptedTransport {
		/// Appends replies for `url`.
		pub fn script(self, url: &str, replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
			self.scripts.lock().entry(url.to_owned()).or_default().extend(replies);

			self
		}

		/// Returns every request the transport has observed, in dispatch order.
		pub fn requests(&self) -> Vec<PreparedRequest> {
			self.requests.lock().clone()
		}

		/// Returns the requests dispatched to `url`.
		pub fn requests_to(&self, url: &str) -> Vec<PreparedRequest> {
			self.requests.lock().iter().filter(|request| request.url == url).cloned().collect()
		}

		fn next_reply(&self, url: &str) -> ScriptedReply {
			let mut scripts = self.scripts.lock();

			match scripts.get_mut(url) {
				Some(queue) if queue.len() > 1 => queue.remove(0),
				Some(queue) => queue.first().cloned().unwrap_or(ScriptedReply::Status(404)),
				None => ScriptedReply::Status(404),
			}
		}
	}
	impl RequestTransport for ScriptedTransport {
		fn call(&self, request: PreparedRequest) -> Option<TransportFuture<'_>> {
			let url = request.url.clone();
			let outcome = match self.next_reply(&url) {
				ScriptedReply::Ok(body) => Ok(Response::new(200, url, body)),
				ScriptedReply::Status(code) =>
					Err(Error::Status(StatusFailure::new(code, Some(url)))),
				ScriptedReply::Unconstructible => return None,
			};

			self.requests.lock().push(request);

			Some(Box::pin(async move { outcome }))
		}
	}

	/// Token payload served by the default refresh endpoint in scripted tests.
	pub fn token_payload(token: &str) -> Vec<u8> {
		serde_json::to_vec(&serde_json::json!({ "token": token }))
			.expect("Token payload fixture should serialize.")
	}

	/// Memory store seeded with a received credential.
	pub fn seeded_store(token: &str) -> Arc<MemoryTokenStore> {
		Arc::new(MemoryTokenStore::with_credential(Credential::received(TokenSecret::new(token))))
	}

	/// Builds an interceptor over the scripted transport and a seeded memory store.
	pub fn build_scripted_interceptor(
		transport: ScriptedTransport,
		token: &str,
	) -> (Interceptor, Arc<MemoryTokenStore>) {
		let store = seeded_store(token);
		let store_dyn: Arc<dyn TokenStore> = store.clone();
		let interceptor = Interceptor::new(Arc::new(transport), store_dyn);

		(interceptor, store)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result, StatusFailure};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
