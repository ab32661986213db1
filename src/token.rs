//! Access token wrapper that redacts sensitive material, plus bearer header helpers.

// crates.io
use reqwest::header::{HeaderValue, InvalidHeaderValue};
// self
use crate::_prelude::*;

const BEARER: &str = "Bearer";

/// Redacted access token wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Formats the token as an `Authorization: Bearer <token>` header value.
	///
	/// The returned value is flagged sensitive so HTTP/2 HPACK never indexes it.
	pub fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = HeaderValue::from_str(&format!("{BEARER} {}", self.0))?;

		value.set_sensitive(true);

		Ok(value)
	}

	/// Extracts a token from a refresh response `Authorization` header.
	///
	/// The refresh endpoint answers with `Bearer: <token>`; the plain `Bearer <token>` form and a
	/// bare token are accepted too. Returns `None` when nothing but whitespace remains.
	pub fn from_refresh_header(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		let token = match raw.get(..BEARER.len()) {
			Some(scheme) if scheme.eq_ignore_ascii_case(BEARER) => {
				let rest = &raw[BEARER.len()..];

				match rest.strip_prefix(':') {
					Some(rest) => rest,
					None if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
					None => raw,
				}
			},
			_ => raw,
		}
		.trim();

		if token.is_empty() { None } else { Some(Self::new(token)) }
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
