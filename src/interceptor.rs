//! Authenticated request interceptor with bounded 401 recovery.
//!
//! Every request issued through an [`Interceptor`] carries `Content-Type: application/json` and,
//! when the store holds a usable token, `Authorization: Bearer <token>`. A 401 response starts a
//! recovery cycle: one attempt is drawn from the shared [`RecoveryBudget`], the credential is
//! marked as needed, the refresh endpoint is fetched through the same interceptor, the returned
//! token is stored, and the original descriptor is dispatched again. Any other failure passes
//! through unchanged.

mod budget;
mod config;
mod metrics;

pub use budget::RecoveryBudget;
pub use config::InterceptorConfig;
pub use metrics::RecoveryMetrics;

// std
use std::future::IntoFuture;
// crates.io
use ::http::{
	HeaderValue,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::TokenMessage,
	error::ConfigError,
	http::{PreparedRequest, RequestTransport, Response},
	obs::{self, ExchangeOutcome, ExchangeSpan},
	request::{RequestDescriptor, RequestOptions, Verb},
	store::TokenStore,
};

/// Boxed future resolving to the terminal outcome of an exchange.
pub type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + 'a + Send>>;

const JSON_MEDIA_TYPE: &str = "application/json";

/// Wraps a [`RequestTransport`] and a [`TokenStore`] with bearer attachment and 401 recovery.
///
/// Clones share the transport, store, budget, and metrics.
#[derive(Clone)]
pub struct Interceptor {
	transport: Arc<dyn RequestTransport>,
	store: Arc<dyn TokenStore>,
	config: Arc<InterceptorConfig>,
	budget: Arc<RecoveryBudget>,
	metrics: Arc<RecoveryMetrics>,
}
impl Interceptor {
	/// Creates an interceptor with the default configuration.
	pub fn new(transport: Arc<dyn RequestTransport>, store: Arc<dyn TokenStore>) -> Self {
		Self::from_parts(transport, store, InterceptorConfig::default())
	}

	/// Creates an interceptor after validating `config`.
	pub fn with_config(
		transport: Arc<dyn RequestTransport>,
		store: Arc<dyn TokenStore>,
		config: InterceptorConfig,
	) -> Result<Self, ConfigError> {
		config.validate()?;

		Ok(Self::from_parts(transport, store, config))
	}

	/// Replaces the recovery budget, e.g. to share one across several interceptors.
	///
	/// The configured `max_recovery_attempts` is updated to the injected budget's limit.
	pub fn with_budget(mut self, budget: Arc<RecoveryBudget>) -> Self {
		self.config = Arc::new(InterceptorConfig {
			max_recovery_attempts: budget.limit(),
			..InterceptorConfig::clone(&self.config)
		});
		self.budget = budget;

		self
	}

	fn from_parts(
		transport: Arc<dyn RequestTransport>,
		store: Arc<dyn TokenStore>,
		config: InterceptorConfig,
	) -> Self {
		let budget = Arc::new(RecoveryBudget::new(config.max_recovery_attempts));

		Self {
			transport,
			store,
			config: Arc::new(config),
			budget,
			metrics: Default::default(),
		}
	}

	/// Active configuration.
	pub fn config(&self) -> &InterceptorConfig {
		&self.config
	}

	/// Recovery budget shared by every exchange of this interceptor.
	pub fn budget(&self) -> &RecoveryBudget {
		&self.budget
	}

	/// Recovery counters.
	pub fn metrics(&self) -> &RecoveryMetrics {
		&self.metrics
	}

	/// Token store consulted before every attempt.
	pub fn store(&self) -> &Arc<dyn TokenStore> {
		&self.store
	}

	/// Issues a `GET`.
	pub fn get(&self, url: impl Into<String>) -> Exchange {
		self.get_with(url, RequestOptions::default())
	}

	/// Issues a `GET` with per-call options.
	pub fn get_with(&self, url: impl Into<String>, options: RequestOptions) -> Exchange {
		self.exchange(RequestDescriptor::for_verb(Verb::Get, url).with_options(options))
	}

	/// Issues a `POST`.
	pub fn post(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Exchange {
		self.post_with(url, body, RequestOptions::default())
	}

	/// Issues a `POST` with per-call options.
	pub fn post_with(
		&self,
		url: impl Into<String>,
		body: impl Into<Vec<u8>>,
		options: RequestOptions,
	) -> Exchange {
		self.exchange(
			RequestDescriptor::for_verb(Verb::Post, url).with_body(body).with_options(options),
		)
	}

	/// Issues a `PUT`.
	pub fn put(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Exchange {
		self.put_with(url, body, RequestOptions::default())
	}

	/// Issues a `PUT` with per-call options.
	pub fn put_with(
		&self,
		url: impl Into<String>,
		body: impl Into<Vec<u8>>,
		options: RequestOptions,
	) -> Exchange {
		self.exchange(
			RequestDescriptor::for_verb(Verb::Put, url).with_body(body).with_options(options),
		)
	}

	/// Issues a `PATCH`.
	pub fn patch(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Exchange {
		self.patch_with(url, body, RequestOptions::default())
	}

	/// Issues a `PATCH` with per-call options.
	pub fn patch_with(
		&self,
		url: impl Into<String>,
		body: impl Into<Vec<u8>>,
		options: RequestOptions,
	) -> Exchange {
		self.exchange(
			RequestDescriptor::for_verb(Verb::Patch, url).with_body(body).with_options(options),
		)
	}

	/// Issues a `DELETE`.
	pub fn delete(&self, url: impl Into<String>) -> Exchange {
		self.delete_with(url, RequestOptions::default())
	}

	/// Issues a `DELETE` with per-call options.
	pub fn delete_with(&self, url: impl Into<String>, options: RequestOptions) -> Exchange {
		self.exchange(RequestDescriptor::for_verb(Verb::Delete, url).with_options(options))
	}

	/// Issues a `HEAD`.
	pub fn head(&self, url: impl Into<String>) -> Exchange {
		self.head_with(url, RequestOptions::default())
	}

	/// Issues a `HEAD` with per-call options.
	pub fn head_with(&self, url: impl Into<String>, options: RequestOptions) -> Exchange {
		self.exchange(RequestDescriptor::for_verb(Verb::Head, url).with_options(options))
	}

	/// Issues an `OPTIONS`.
	pub fn options(&self, url: impl Into<String>) -> Exchange {
		self.options_with(url, RequestOptions::default())
	}

	/// Issues an `OPTIONS` with per-call options.
	pub fn options_with(&self, url: impl Into<String>, options: RequestOptions) -> Exchange {
		self.exchange(RequestDescriptor::for_verb(Verb::Options, url).with_options(options))
	}

	/// Dispatches a pre-built descriptor.
	///
	/// `None` resolves to a synthetic 404 without touching the transport.
	pub fn request(&self, descriptor: Option<RequestDescriptor>) -> Exchange {
		Exchange { interceptor: self.clone(), descriptor }
	}

	/// Computes the outgoing request for `descriptor` from the current credential.
	///
	/// Caller headers are kept; `Content-Type` is always set to JSON and `Authorization` is set
	/// only when the stored token is non-empty and not flagged as needed. `GET` requests without
	/// a body receive an empty one.
	pub async fn prepare(&self, descriptor: &RequestDescriptor) -> Result<PreparedRequest> {
		let credential = self.store.credential().await?;
		let mut headers = descriptor.options.headers.clone();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));

		if let Some(token) = credential.usable() {
			let mut value =
				HeaderValue::from_str(&token.bearer()).map_err(|_| Error::InvalidCredential)?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		let body = match (descriptor.verb, &descriptor.body) {
			(Verb::Get, None) => Some(Vec::new()),
			(_, body) => body.clone(),
		};

		Ok(PreparedRequest {
			method: descriptor.method.clone(),
			url: descriptor.url.clone(),
			headers,
			body,
		})
	}

	fn exchange(&self, descriptor: RequestDescriptor) -> Exchange {
		self.request(Some(descriptor))
	}

	// Recovery unwinds through `waiting` on the heap: each entry is a descriptor whose retry waits
	// on the refresh currently in flight above it. Poll depth stays constant for any limit.
	fn dispatch(&self, descriptor: RequestDescriptor) -> ExchangeFuture<'_> {
		Box::pin(async move {
			let mut current = Attempt { descriptor, stage: "request" };
			let mut waiting = Vec::<RequestDescriptor>::new();

			loop {
				let outcome = self.attempt(&current).await;

				match outcome {
					Ok(response) => {
						let Some(parent) = waiting.pop() else {
							return Ok(response);
						};

						if let Err(err) = self.store_refreshed(&response).await {
							self.metrics.record_failures(waiting.len() + 1);

							return Err(err);
						}

						self.metrics.record_success();

						current = Attempt { descriptor: parent, stage: "retry" };
					},
					Err(err) if err.is_unauthorized() => {
						let verb = current.descriptor.verb;

						if !self.budget.try_consume() {
							self.metrics.record_exhausted();
							self.metrics.record_failures(waiting.len());
							obs::report_exhausted(verb, &current.descriptor.url, self.budget.limit());
							obs::record_exchange_outcome(verb, ExchangeOutcome::Exhausted);

							return Err(err);
						}

						self.metrics.record_attempt();
						obs::report_recovery(
							verb,
							&current.descriptor.url,
							self.budget.used(),
							self.budget.limit(),
						);
						obs::record_exchange_outcome(verb, ExchangeOutcome::Recovery);

						if let Err(err) = self.store.mark_needed().await {
							self.metrics.record_failures(waiting.len() + 1);

							return Err(err.into());
						}

						let refresh = Attempt {
							descriptor: RequestDescriptor::for_verb(
								Verb::Get,
								self.config.refresh_endpoint.as_str(),
							),
							stage: "refresh",
						};

						waiting.push(std::mem::replace(&mut current, refresh).descriptor);
					},
					Err(err) => {
						self.metrics.record_failures(waiting.len());

						return Err(err);
					},
				}
			}
		})
	}

	// A single transport call; 401s are left to the caller's recovery loop.
	async fn attempt(&self, attempt: &Attempt) -> Result<Response> {
		let descriptor = &attempt.descriptor;
		let verb = descriptor.verb;
		let span = ExchangeSpan::new(verb, attempt.stage);

		span.instrument(async move {
			let prepared = self.prepare(descriptor).await?;

			obs::record_exchange_outcome(verb, ExchangeOutcome::Attempt);

			let Some(call) = self.transport.call(prepared) else {
				obs::record_exchange_outcome(verb, ExchangeOutcome::Failure);

				return Err(StatusFailure::not_found(Some(descriptor.url.clone())).into());
			};

			match call.await {
				Ok(response) => {
					obs::record_exchange_outcome(verb, ExchangeOutcome::Success);

					Ok(response)
				},
				Err(err) if err.is_unauthorized() => Err(err),
				Err(err) => {
					obs::report_unrecovered(verb, &descriptor.url, &err);
					obs::record_exchange_outcome(verb, ExchangeOutcome::Failure);

					Err(err)
				},
			}
		})
		.await
	}

	async fn store_refreshed(&self, response: &Response) -> Result<()> {
		let message = TokenMessage::from_slice(&self.config.refresh_endpoint, &response.body)?;

		self.store.set_credential(message.token).await?;

		Ok(())
	}
}
impl Debug for Interceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Interceptor")
			.field("config", &self.config)
			.field("budget", &self.budget)
			.field("metrics", &self.metrics)
			.finish()
	}
}

struct Attempt {
	descriptor: RequestDescriptor,
	stage: &'static str,
}

/// Lazy handle for one intercepted request.
///
/// Nothing is sent until the exchange is awaited. Every await of a clone (or every call to
/// [`Exchange::send`]) performs its own transport call; in-flight calls are never shared.
/// Dropping the future before it resolves cancels the exchange, including any pending refresh,
/// and no retry is dispatched afterwards.
#[derive(Clone, Debug)]
pub struct Exchange {
	interceptor: Interceptor,
	descriptor: Option<RequestDescriptor>,
}
impl Exchange {
	/// Descriptor this exchange dispatches, if one could be built.
	pub fn descriptor(&self) -> Option<&RequestDescriptor> {
		self.descriptor.as_ref()
	}

	/// Starts a fresh run of the exchange.
	pub fn send(&self) -> ExchangeFuture<'static> {
		self.clone().into_future()
	}
}
impl IntoFuture for Exchange {
	type IntoFuture = ExchangeFuture<'static>;
	type Output = Result<Response>;

	fn into_future(self) -> Self::IntoFuture {
		let Self { interceptor, descriptor } = self;

		Box::pin(async move {
			match descriptor {
				Some(descriptor) => interceptor.dispatch(descriptor).await,
				None => Err(StatusFailure::not_found(None).into()),
			}
		})
	}
}
