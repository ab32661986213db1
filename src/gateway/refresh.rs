//! The refresh call itself: `POST {base}/auth/refresh`, read the new token from the response
//! `Authorization` header, persist it.

// crates.io
use reqwest::header::AUTHORIZATION;
// self
use crate::{
	error::RefreshError, gateway::Gateway, singleflight::RefreshOutcome, token::AccessToken,
};

impl Gateway {
	/// Performs one refresh call; only ever invoked by the flight leader.
	pub(crate) async fn request_new_token(&self) -> RefreshOutcome {
		self.metrics.record_attempt();

		#[cfg(feature = "tracing")]
		tracing::debug!(endpoint = %self.config.refresh_endpoint, "requesting a new access token");

		let outcome = self.exchange().await;

		match &outcome {
			Ok(_) => self.metrics.record_success(),
			Err(e) => {
				self.metrics.record_failure();

				#[cfg(feature = "tracing")]
				tracing::warn!(error = %e, "access token refresh failed");
				#[cfg(not(feature = "tracing"))]
				let _ = e;
			},
		}

		outcome
	}

	async fn exchange(&self) -> RefreshOutcome {
		let response = self
			.http_client
			.post(self.config.refresh_endpoint.clone())
			.send()
			.await
			.map_err(RefreshError::network)?;
		let status = response.status();

		if !status.is_success() {
			return Err(RefreshError::Rejected { status: status.as_u16() });
		}

		let token = response
			.headers()
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(AccessToken::from_refresh_header)
			.ok_or(RefreshError::MissingToken)?;

		token.bearer_header().map_err(|_| RefreshError::MalformedToken)?;

		self.store
			.set(&self.config.token_cookie, token.clone(), self.config.token_ttl)
			.await
			.map_err(RefreshError::Store)?;

		Ok(token)
	}
}
