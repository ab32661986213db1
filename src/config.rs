//! Gateway configuration: base URL, refresh endpoint, token cookie, and request defaults.

// std
use std::env;
// crates.io
use cookie::Cookie;
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable read by [`GatewayConfig::from_env`].
pub const BASE_URL_ENV: &str = "AUTH_GATEWAY_BASE_URL";

/// Resolved, validated gateway configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
	/// Base URL every relative endpoint is resolved against.
	pub base_url: Url,
	/// Absolute refresh endpoint (`{base_url}{refresh_path}`).
	pub refresh_endpoint: Url,
	/// Cookie name the access token is stored under.
	pub token_cookie: String,
	/// Lifetime applied to a token when it is written to the store.
	pub token_ttl: Duration,
	/// `Content-Type` sent with every request by default.
	pub content_type: String,
}
impl GatewayConfig {
	/// Default refresh path appended to the base URL.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default cookie name holding the access token.
	pub const DEFAULT_TOKEN_COOKIE: &'static str = "accessToken";
	/// Default token lifetime (4 days).
	pub const DEFAULT_TOKEN_TTL: Duration = Duration::days(4);
	/// Default request content type.
	pub const DEFAULT_CONTENT_TYPE: &'static str = "application/json";

	/// Returns a builder seeded with the provided base URL and defaults for everything else.
	pub fn builder(base_url: Url) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(base_url)
	}

	/// Reads the base URL from [`BASE_URL_ENV`] and applies defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_env_var(BASE_URL_ENV)
	}

	/// Reads the base URL from the named environment variable and applies defaults.
	pub fn from_env_var(name: &str) -> Result<Self, ConfigError> {
		let raw = env::var(name).map_err(|_| ConfigError::MissingEnv { name: name.into() })?;
		let base_url = Url::parse(raw.trim())
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		Self::builder(base_url).build()
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Debug)]
pub struct GatewayConfigBuilder {
	/// Base URL for the backend.
	pub base_url: Url,
	/// Path of the refresh endpoint, relative to the base URL.
	pub refresh_path: String,
	/// Cookie name holding the access token.
	pub token_cookie: String,
	/// Lifetime applied to stored tokens.
	pub token_ttl: Duration,
	/// Default request content type.
	pub content_type: String,
}
impl GatewayConfigBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: GatewayConfig::DEFAULT_REFRESH_PATH.into(),
			token_cookie: GatewayConfig::DEFAULT_TOKEN_COOKIE.into(),
			token_ttl: GatewayConfig::DEFAULT_TOKEN_TTL,
			content_type: GatewayConfig::DEFAULT_CONTENT_TYPE.into(),
		}
	}

	/// Overrides the refresh path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the cookie name holding the access token.
	pub fn token_cookie(mut self, name: impl Into<String>) -> Self {
		self.token_cookie = name.into();

		self
	}

	/// Overrides the lifetime applied to stored tokens.
	pub fn token_ttl(mut self, ttl: Duration) -> Self {
		self.token_ttl = ttl;

		self
	}

	/// Overrides the default request content type.
	pub fn content_type(mut self, value: impl Into<String>) -> Self {
		self.content_type = value.into();

		self
	}

	/// Consumes the builder and validates the resulting config.
	pub fn build(self) -> Result<GatewayConfig, ConfigError> {
		validate_base_url(&self.base_url)?;
		validate_cookie_name(&self.token_cookie)?;

		if !self.token_ttl.is_positive() {
			return Err(ConfigError::NonPositiveTokenTtl);
		}
		if reqwest::header::HeaderValue::from_str(&self.content_type).is_err() {
			return Err(ConfigError::InvalidContentType { value: self.content_type });
		}

		let refresh_endpoint = join_endpoint(&self.base_url, &self.refresh_path)?;

		Ok(GatewayConfig {
			base_url: self.base_url,
			refresh_endpoint,
			token_cookie: self.token_cookie,
			token_ttl: self.token_ttl,
			content_type: self.content_type,
		})
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ConfigError::UnsupportedScheme { url: url.to_string() }),
	}
}

// Names are percent-encoded on the wire, so a name is valid when it survives an encode/parse trip.
fn validate_cookie_name(name: &str) -> Result<(), ConfigError> {
	let encoded = Cookie::new(name, "").encoded().to_string();

	match Cookie::parse_encoded(encoded) {
		Ok(cookie) if cookie.name() == name => Ok(()),
		_ => Err(ConfigError::InvalidCookieName { name: name.into() }),
	}
}

// Concatenates instead of `Url::join` so a base path such as `/api` is kept.
fn join_endpoint(base: &Url, path: &str) -> Result<Url, ConfigError> {
	if !path.starts_with('/') {
		return Err(ConfigError::InvalidRefreshPath { path: path.into() });
	}

	let joined = format!("{}{path}", base.as_str().trim_end_matches('/'));

	Url::parse(&joined).map_err(|source| ConfigError::InvalidBaseUrl { source })
}
