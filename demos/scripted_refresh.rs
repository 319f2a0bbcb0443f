//! Demonstrates plugging a custom transport into the interceptor and watching a 401 recovery.
//!
//! 1. Implement [`RequestTransport`] so the transport answers 401 for any bearer other than the
//!    one it currently issues, and serves `/assets/token.json` without authentication.
//! 2. Seed a [`MemoryTokenStore`] with an outdated token.
//! 3. Issue a `GET` and a `POST`; the first one refreshes the credential, the second one reuses
//!    it.

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use color_eyre::Result;
use http::header::AUTHORIZATION;
// self
use bearer_interceptor::{
	auth::{Credential, TokenSecret},
	error::{self, StatusFailure},
	http::{PreparedRequest, RequestTransport, Response, TransportFuture},
	interceptor::Interceptor,
	store::{MemoryTokenStore, TokenStore},
};

const CURRENT_TOKEN: &str = "token-v2";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let transport = Arc::new(DemoTransport::default());
	let store = Arc::new(MemoryTokenStore::with_credential(Credential::received(
		TokenSecret::new("token-v1"),
	)));
	let store_dyn: Arc<dyn TokenStore> = store.clone();
	let interceptor = Interceptor::new(transport.clone(), store_dyn);
	let todos = interceptor.get("/api/todos").await?;

	println!("GET /api/todos -> {} {}.", todos.status, todos.text());

	let created = interceptor.post("/api/todos", "{\"title\":\"ship it\"}").await?;

	println!("POST /api/todos -> {} {}.", created.status, created.text());
	println!(
		"Transport calls: {}; recoveries left: {}; stored token rotated: {}.",
		transport.calls.load(Ordering::Relaxed),
		interceptor.budget().remaining(),
		store.snapshot().usable().map(TokenSecret::expose) == Some(CURRENT_TOKEN),
	);

	match interceptor.request(None).await {
		Ok(_) => println!("A missing descriptor unexpectedly succeeded."),
		Err(e) => println!("A missing descriptor resolves to: {e}"),
	}

	Ok(())
}

#[derive(Default)]
struct DemoTransport {
	calls: AtomicUsize,
}
impl RequestTransport for DemoTransport {
	fn call(&self, request: PreparedRequest) -> Option<TransportFuture<'_>> {
		self.calls.fetch_add(1, Ordering::Relaxed);

		let expected = format!("Bearer {CURRENT_TOKEN}");
		let authorized = request
			.headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value == expected);
		let url = request.url.clone();
		let outcome: error::Result<Response> = match request.url.as_str() {
			"/assets/token.json" =>
				Ok(Response::new(200, url, format!("{{\"token\":\"{CURRENT_TOKEN}\"}}"))),
			_ if !authorized => Err(StatusFailure::new(401, Some(url)).into()),
			"/api/todos" if request.method == "POST" =>
				Ok(Response::new(201, url, request.body.unwrap_or_default())),
			"/api/todos" => Ok(Response::new(200, url, "[]")),
			_ => Err(StatusFailure::new(404, Some(url)).into()),
		};

		Some(Box::pin(async move { outcome }))
	}
}
