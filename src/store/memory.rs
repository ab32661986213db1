//! Thread-safe in-memory [`TokenStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, StoredToken, TokenStore},
	token::AccessToken,
};

type StoreMap = Arc<RwLock<HashMap<String, StoredToken>>>;

/// Thread-safe storage backend that keeps tokens in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns the raw entry under `name`, expired or not.
	pub fn entry(&self, name: &str) -> Option<StoredToken> {
		self.0.read().get(name).cloned()
	}

	fn set_now(map: StoreMap, name: &str, entry: StoredToken) -> Result<(), StoreError> {
		map.write().insert(name.to_owned(), entry);

		Ok(())
	}

	fn get_now(map: StoreMap, name: &str, now: OffsetDateTime) -> Option<AccessToken> {
		map.read().get(name).and_then(|entry| entry.live_token(now))
	}
}
impl TokenStore for MemoryStore {
	fn get<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<AccessToken>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::get_now(map, name, OffsetDateTime::now_utc())) })
	}

	fn set<'a>(
		&'a self,
		name: &'a str,
		token: AccessToken,
		ttl: Duration,
	) -> StoreFuture<'a, ()> {
		let map = self.0.clone();
		let entry = StoredToken::new(token, OffsetDateTime::now_utc(), ttl);

		Box::pin(async move { Self::set_now(map, name, entry) })
	}
}
