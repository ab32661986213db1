//! [`TokenStore`] backed by a `reqwest` cookie jar, mirroring browser cookie storage.
//!
//! Tokens are written as percent-encoded host cookies for the base URL with a `Max-Age` equal to
//! the requested lifetime, so the jar enforces expiry and the token cookie travels with every
//! request the gateway client sends to that host. Reads decode the value and drop surrounding
//! double quotes, so server-set cookies such as `accessToken="abc"` yield `abc`.

// crates.io
use cookie::Cookie;
use reqwest::cookie::{CookieStore as _, Jar};
// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenStore},
	token::AccessToken,
};

/// Cookie-jar backed token store scoped to a single origin.
#[derive(Clone)]
pub struct CookieStore {
	jar: Arc<Jar>,
	url: Url,
}
impl CookieStore {
	/// Wraps an existing jar; cookies are scoped to `url`'s host.
	pub fn new(jar: Arc<Jar>, url: Url) -> Self {
		Self { jar, url }
	}

	/// Shared jar, suitable for [`reqwest::ClientBuilder::cookie_provider`].
	pub fn jar(&self) -> Arc<Jar> {
		self.jar.clone()
	}

	fn get_now(&self, name: &str) -> Option<AccessToken> {
		let header = self.jar.cookies(&self.url)?;
		let header = header.to_str().ok()?;

		Cookie::split_parse_encoded(header)
			.filter_map(Result::ok)
			.find(|cookie| cookie.name() == name)
			.map(|cookie| AccessToken::new(cookie.value_trimmed()))
			.filter(|token| !token.expose().is_empty())
	}

	fn set_now(&self, name: &str, token: &AccessToken, ttl: Duration) -> Result<(), StoreError> {
		let cookie = Cookie::build((name, token.expose()))
			.max_age(ttl.max(Duration::ZERO))
			.path("/")
			.build();
		let encoded = cookie.encoded().to_string();

		// The jar silently ignores cookies it cannot parse.
		Cookie::parse(encoded.as_str()).map_err(|e| StoreError::Backend {
			message: format!("Access token cannot be encoded as a cookie value: {e}."),
		})?;
		self.jar.add_cookie_str(&encoded, &self.url);

		Ok(())
	}
}
impl Debug for CookieStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CookieStore").field("url", &self.url.as_str()).finish()
	}
}
impl TokenStore for CookieStore {
	fn get<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<AccessToken>> {
		Box::pin(async move { Ok(self.get_now(name)) })
	}

	fn set<'a>(
		&'a self,
		name: &'a str,
		token: AccessToken,
		ttl: Duration,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.set_now(name, &token, ttl) })
	}
}
