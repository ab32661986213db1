//! Shared fixtures for the gateway integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// self
use auth_gateway::{
	config::GatewayConfig,
	error::Error,
	gateway::Gateway,
	reqwest_middleware,
	store::{MemoryStore, TokenStore},
	token::AccessToken,
	url::Url,
};

/// Builds a gateway config pointing at a mock server base URL.
pub fn test_config(base_url: &str) -> GatewayConfig {
	GatewayConfig::builder(
		Url::parse(base_url).expect("Mock server base URL should parse successfully."),
	)
	.build()
	.expect("Test gateway config should build successfully.")
}

/// Constructs a [`Gateway`] backed by an in-memory token store, returning the store so tests can
/// seed and inspect tokens.
pub fn build_test_gateway(base_url: &str) -> (Gateway, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn TokenStore> = store_backend.clone();
	let gateway =
		Gateway::new(test_config(base_url), store).expect("Test gateway should build successfully.");

	(gateway, store_backend)
}

/// Seeds `token` under the configured cookie name with the configured lifetime.
pub async fn seed_token(store: &MemoryStore, config: &GatewayConfig, token: &str) {
	store
		.set(&config.token_cookie, AccessToken::new(token), config.token_ttl)
		.await
		.expect("Seeding the token store should succeed.");
}

/// Reads the token currently stored under the configured cookie name.
pub async fn stored_token(store: &MemoryStore, config: &GatewayConfig) -> Option<String> {
	store
		.get(&config.token_cookie)
		.await
		.expect("Reading the token store should succeed.")
		.map(|token| token.expose().to_owned())
}

/// Recovers the gateway error carried by a middleware failure.
pub fn gateway_error(err: reqwest_middleware::Error) -> Error {
	match err {
		reqwest_middleware::Error::Middleware(inner) => inner
			.downcast::<Error>()
			.expect("Middleware failure should carry a gateway error."),
		other => panic!("Expected a middleware error, got: {other:?}."),
	}
}
