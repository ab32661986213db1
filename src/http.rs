//! Transport primitives: the underlying `reqwest` client and the replay marker.
//!
//! Every gateway request goes out through one [`ReqwestClient`] configured with the default
//! content type and a cookie store, so credentials (cookies) are always included, including on
//! the refresh call. The refresh call uses that client directly and never re-enters the
//! middleware chain.

// crates.io
use reqwest::{
	cookie::Jar,
	header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
// self
use crate::{_prelude::*, config::GatewayConfig, error::ConfigError};

/// Request extension marking a request that was already replayed after a refresh.
///
/// The gateway inserts it before replaying; a `401` on a marked request is returned as the final
/// response. Callers may attach it up front (for example with
/// `RequestBuilder::with_extension(Replayed)`) to opt a request out of refresh handling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Replayed;

/// Builds the `reqwest` client shared by regular requests and the refresh call.
///
/// When `jar` is `None` the client keeps its own private cookie store.
pub fn build_client(
	config: &GatewayConfig,
	jar: Option<Arc<Jar>>,
) -> Result<ReqwestClient, ConfigError> {
	let mut headers = HeaderMap::new();
	let content_type = HeaderValue::from_str(&config.content_type)
		.map_err(|_| ConfigError::InvalidContentType { value: config.content_type.clone() })?;

	headers.insert(CONTENT_TYPE, content_type);

	let builder = ReqwestClient::builder().default_headers(headers);
	let builder = match jar {
		Some(jar) => builder.cookie_provider(jar),
		None => builder.cookie_store(true),
	};

	Ok(builder.build()?)
}
