//! Token store capability and built-in backends.
//!
//! The gateway never talks to a cookie library directly; it reads and writes the access token
//! through [`TokenStore`], so browsers-style cookie jars, files, or test doubles can all back the
//! same gateway.

pub mod cookie;
pub mod file;
pub mod memory;

pub use cookie::CookieStore;
pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, token::AccessToken};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage contract for the access token, keyed by cookie name.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the token stored under `name`, if present and not expired.
	fn get<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<AccessToken>>;

	/// Stores or replaces the token under `name`, expiring after `ttl`.
	fn set<'a>(&'a self, name: &'a str, token: AccessToken, ttl: Duration)
	-> StoreFuture<'a, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Token value paired with the instant it stops being served.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
	/// Access token secret.
	pub token: AccessToken,
	/// Expiry instant; the token reads as absent from this instant on.
	pub expires_at: OffsetDateTime,
}
impl StoredToken {
	/// Creates an entry that expires `ttl` after `now`.
	pub fn new(token: AccessToken, now: OffsetDateTime, ttl: Duration) -> Self {
		Self { token, expires_at: now.saturating_add(ttl) }
	}

	/// Returns `true` once `instant` reaches the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	pub(crate) fn live_token(&self, now: OffsetDateTime) -> Option<AccessToken> {
		if self.is_expired_at(now) { None } else { Some(self.token.clone()) }
	}
}
