//! Gateway-level error types shared across configuration, stores, and the refresh path.

// self
use crate::_prelude::*;

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// When the error leaves the middleware it is wrapped in
/// [`reqwest_middleware::Error::Middleware`]; use `downcast_ref::<Error>()` on the inner value to
/// recover it.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token refresh failed; delivered to the caller that started it and every caller waiting on
	/// it.
	#[error(transparent)]
	Refresh(#[from] RefreshError),

	/// Stored access token cannot be encoded as an `Authorization` header value.
	#[error("Stored access token cannot be encoded as an Authorization header value.")]
	InvalidTokenHeader,
}
impl From<Error> for reqwest_middleware::Error {
	fn from(e: Error) -> Self {
		Self::middleware(e)
	}
}

/// Configuration and validation failures raised while assembling a gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Environment variable holding the base URL is not set or not unicode.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name that was read.
		name: String,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than `http`/`https`.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// Refresh path must be absolute.
	#[error("Refresh path must start with `/`: {path}.")]
	InvalidRefreshPath {
		/// Path that failed validation.
		path: String,
	},
	/// Token cookie name cannot be carried by a cookie, e.g. because it is empty.
	#[error("Token cookie name `{name}` is not a valid cookie name.")]
	InvalidCookieName {
		/// Name that failed validation.
		name: String,
	},
	/// Token lifetime must be positive.
	#[error("Token lifetime must be positive.")]
	NonPositiveTokenTtl,
	/// Content type cannot be used as a header value.
	#[error("Content type `{value}` is not a valid header value.")]
	InvalidContentType {
		/// Value that failed validation.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Outcome of a failed refresh.
///
/// The type is `Clone` so a single failure can be handed to every request that waited on the
/// refresh.
#[derive(Clone, Debug, ThisError)]
pub enum RefreshError {
	/// Refresh endpoint could not be reached.
	#[error("Network error occurred while calling the refresh endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: Arc<ReqwestError>,
	},
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the request with HTTP {status}.")]
	Rejected {
		/// HTTP status code returned by the refresh endpoint.
		status: u16,
	},
	/// Refresh response did not carry a usable access token.
	#[error("Refresh endpoint response did not provide an access token.")]
	MissingToken,
	/// Refresh response carried a token that cannot be sent back as a header value.
	#[error("Refresh endpoint returned an access token that is not a valid header value.")]
	MalformedToken,
	/// New token could not be persisted.
	#[error("Refreshed access token could not be stored: {0}")]
	Store(#[source] crate::store::StoreError),
	/// Caller that started the refresh went away before it settled.
	#[error("Refresh was abandoned before it completed.")]
	Abandoned,
}
impl RefreshError {
	/// Wraps a transport-specific network error.
	pub fn network(src: ReqwestError) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_gateway_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let gateway_error: Error = store_error.clone().into();

		assert!(matches!(gateway_error, Error::Storage(_)));
		assert!(gateway_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&gateway_error)
			.expect("Gateway error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn refresh_error_survives_middleware_wrapping() {
		let err: reqwest_middleware::Error =
			Error::from(RefreshError::Rejected { status: 503 }).into();

		match err {
			reqwest_middleware::Error::Middleware(inner) => {
				let recovered = inner
					.downcast_ref::<Error>()
					.expect("Middleware error should wrap the gateway error.");

				assert!(matches!(recovered, Error::Refresh(RefreshError::Rejected { status: 503 })));
			},
			other => panic!("Unexpected middleware error variant: {other:?}."),
		}
	}
}
