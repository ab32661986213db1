//! Sends one authenticated GET through the gateway.
//!
//! ```sh
//! AUTH_GATEWAY_BASE_URL=https://api.example.com cargo run --example gateway -- /me <token>
//! ```
//!
//! The token (optional) is written to the cookie-backed store first; a `401` from the backend
//! triggers `POST /auth/refresh` and one replay.

// std
use std::env;
// crates.io
use color_eyre::Result;
// self
use auth_gateway::{config::GatewayConfig, gateway::Gateway, token::AccessToken};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let mut args = env::args().skip(1);
	let path = args.next().unwrap_or_else(|| "/".into());
	let config = GatewayConfig::from_env()?;
	let url = format!("{}{path}", config.base_url.as_str().trim_end_matches('/'));
	let gateway = Gateway::with_cookie_store(config)?;

	if let Some(token) = args.next() {
		gateway
			.store
			.set(&gateway.config.token_cookie, AccessToken::new(token), gateway.config.token_ttl)
			.await?;
	}

	let client = gateway.clone().into_client();
	let response = client.get(&url).send().await?;

	println!("{} {url}", response.status());
	println!(
		"Refresh calls: {}, replays: {}.",
		gateway.metrics.attempts(),
		gateway.metrics.replays()
	);
	println!("{}", response.text().await?);

	Ok(())
}
