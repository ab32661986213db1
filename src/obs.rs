//! Optional observability helpers for the gateway's recovery path.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `auth_gateway.refresh` with
//!   a `stage` field, plus debug events when a refresh starts, is joined, or fails.
//! - Enable `metrics` to increment the `auth_gateway_refresh_total` counter for every settled
//!   refresh participation, labeled by `role` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for refresh participations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// A usable token came back.
	Success,
	/// The refresh failed and the error reached the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
