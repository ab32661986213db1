//! Bearer-token gateway for reqwest—attach access tokens from a cookie-style store and recover
//! from `401 Unauthorized` with a single-flight refresh and request replay.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod obs;
pub mod singleflight;
pub mod store;
pub mod token;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use reqwest_middleware;
pub use url;
#[cfg(test)] use {color_eyre as _, futures as _, httpmock as _};
