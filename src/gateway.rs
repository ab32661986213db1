//! Authenticated request gateway.
//!
//! [`Gateway`] is a [`reqwest_middleware::Middleware`] that decorates every outbound request
//! with `Authorization: Bearer <token>` read from a [`TokenStore`], and recovers from
//! `401 Unauthorized` by joining or starting a single-flight refresh and replaying the request
//! once with the new token. Every request that hits a `401` while a refresh is in flight waits
//! for that refresh and receives its outcome, failures included.

mod metrics;
mod refresh;

pub use metrics::RefreshMetrics;

// crates.io
use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response, StatusCode, cookie::Jar, header::AUTHORIZATION};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
// self
use crate::{
	_prelude::*,
	config::GatewayConfig,
	http::{self as transport, Replayed},
	obs::{self, GatewaySpan, Outcome},
	singleflight::{FlightRole, RefreshCoordinator},
	store::{CookieStore, TokenStore},
	token::AccessToken,
};

/// Attaches bearer tokens and recovers from `401` responses for one backend.
///
/// Clones share the token store, the refresh coordinator, and the metrics, so a refresh started
/// through one clone is joined by requests going through any other.
#[derive(Clone)]
pub struct Gateway {
	/// Resolved configuration.
	pub config: Arc<GatewayConfig>,
	/// Store the access token is read from and written to.
	pub store: Arc<dyn TokenStore>,
	/// Underlying transport; also used for the refresh call.
	pub http_client: ReqwestClient,
	/// Counters for refresh attempts, joins, and replays.
	pub metrics: Arc<RefreshMetrics>,
	coordinator: Arc<RefreshCoordinator>,
}
impl Gateway {
	/// Creates a gateway over `store`, provisioning a `reqwest` client with its own cookie store.
	pub fn new(config: GatewayConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
		let http_client = transport::build_client(&config, None)?;

		Ok(Self::with_http_client(config, store, http_client))
	}

	/// Creates a gateway whose token lives in a cookie jar shared with the HTTP client, the way a
	/// browser keeps an access-token cookie.
	pub fn with_cookie_store(config: GatewayConfig) -> Result<Self> {
		let jar = Arc::new(Jar::default());
		let store = CookieStore::new(jar.clone(), config.base_url.clone());
		let http_client = transport::build_client(&config, Some(jar))?;

		Ok(Self::with_http_client(config, Arc::new(store), http_client))
	}

	/// Creates a gateway that reuses a caller-provided `reqwest` client.
	///
	/// The client should keep a cookie store so the refresh call carries session cookies.
	pub fn with_http_client(
		config: GatewayConfig,
		store: Arc<dyn TokenStore>,
		http_client: ReqwestClient,
	) -> Self {
		Self {
			config: Arc::new(config),
			store,
			http_client,
			metrics: Default::default(),
			coordinator: Default::default(),
		}
	}

	/// Wraps the underlying client with this gateway as middleware.
	pub fn into_client(self) -> ClientWithMiddleware {
		ClientBuilder::new(self.http_client.clone()).with(self).build()
	}

	/// Returns `true` while a refresh is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.coordinator.is_refreshing()
	}

	/// Reads the current access token from the store.
	pub async fn current_token(&self) -> Result<Option<AccessToken>> {
		Ok(self.store.get(&self.config.token_cookie).await?)
	}

	/// Sets `Authorization: Bearer <token>` when the store holds a token; leaves the request
	/// untouched otherwise.
	pub async fn authorize(&self, request: &mut Request) -> Result<()> {
		if let Some(token) = self.current_token().await? {
			let value = token.bearer_header().map_err(|_| Error::InvalidTokenHeader)?;

			request.headers_mut().insert(AUTHORIZATION, value);
		}

		Ok(())
	}

	/// Joins the in-flight refresh, or starts one when none is running.
	///
	/// Exactly one refresh call is made per flight; every caller receives its outcome.
	pub async fn refresh_access_token(&self) -> Result<AccessToken> {
		let span = GatewaySpan::new("refresh_access_token");

		let outcome = span
			.instrument(async move {
				let (role, outcome) = self.coordinator.run(|| self.request_new_token()).await;

				if role == FlightRole::Joined {
					self.metrics.record_join();
				}

				let label = if outcome.is_ok() { Outcome::Success } else { Outcome::Failure };

				obs::record_refresh_outcome(role, label);

				outcome
			})
			.await;

		Ok(outcome?)
	}
}
impl Debug for Gateway {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("config", &self.config)
			.field("coordinator", &self.coordinator)
			.field("metrics", &self.metrics)
			.finish()
	}
}
#[async_trait]
impl Middleware for Gateway {
	async fn handle(
		&self,
		mut req: Request,
		extensions: &mut Extensions,
		next: Next<'_>,
	) -> reqwest_middleware::Result<Response> {
		self.authorize(&mut req).await?;

		// Streaming bodies cannot be cloned, so such requests are never replayed.
		let replay = if extensions.get::<Replayed>().is_some() { None } else { req.try_clone() };
		let response = next.clone().run(req, extensions).await?;

		if response.status() != StatusCode::UNAUTHORIZED {
			return Ok(response);
		}

		let Some(mut replay) = replay else {
			return Ok(response);
		};

		#[cfg(feature = "tracing")]
		tracing::debug!(url = %replay.url(), "request unauthorized; awaiting token refresh");

		drop(response);
		self.refresh_access_token().await?;
		extensions.insert(Replayed);
		self.authorize(&mut replay).await?;
		self.metrics.record_replay();

		next.run(replay, extensions).await
	}
}
