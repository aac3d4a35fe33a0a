//! Client configuration: API base URL, OAuth client credentials, timeouts, and rate limits.
//!
//! [`ApiConfig`] is assembled through [`ApiConfigBuilder`], which validates every field
//! before handing out an immutable value. [`ApiConfig::from_env`] reads the conventional
//! `FT_API_*` environment variables.

// std
use std::{
	env,
	time::{Duration, Instant},
};
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Environment variable holding the API base URL.
pub const ENV_ENDPOINT: &str = "FT_API_ENDPOINT";
/// Environment variable holding the OAuth client identifier.
pub const ENV_CLIENT_ID: &str = "FT_API_UID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "FT_API_SECRET";
/// Environment variable overriding [`RateLimits::per_second`].
pub const ENV_RATE_PER_SECOND: &str = "FT_API_RATE_LIMIT_PER_SECOND";
/// Environment variable overriding [`RateLimits::per_hour`].
pub const ENV_RATE_PER_HOUR: &str = "FT_API_RATE_LIMIT_PER_HOUR";

/// Scheduler limits applied to every scheduled call.
///
/// The defaults sit slightly below the API's nominal 2 req/s so server-side jitter does not
/// trip the upstream limiter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
	/// Maximum number of calls executing at once.
	pub max_concurrent: usize,
	/// Dispatch rate; consecutive dispatches are spaced by `1 / per_second` seconds.
	pub per_second: f64,
	/// Reservoir capacity, restored in full at every refill boundary.
	pub per_hour: u32,
	/// Interval between reservoir refills.
	#[serde(with = "duration_secs")]
	pub refill_interval: Duration,
}
impl RateLimits {
	/// Minimum spacing between two consecutive dispatches.
	///
	/// Saturates at [`Duration::MAX`] for rates [`RateLimits::validate`] rejects.
	pub fn min_spacing(&self) -> Duration {
		Duration::try_from_secs_f64(1. / self.per_second).unwrap_or(Duration::MAX)
	}

	/// Checks every limit, reporting the first unusable one.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_concurrent == 0 {
			return Err(ConfigError::invalid("max_concurrent", "must be at least 1"));
		}
		if !self.per_second.is_finite() || self.per_second <= 0. {
			return Err(ConfigError::invalid("per_second", "must be a positive finite number"));
		}
		if !fits_clock(self.min_spacing()) {
			return Err(ConfigError::invalid("per_second", "spacing exceeds the clock range"));
		}
		if self.per_hour == 0 {
			return Err(ConfigError::invalid("per_hour", "must be at least 1"));
		}
		if self.refill_interval.is_zero() {
			return Err(ConfigError::invalid("refill_interval", "must be non-zero"));
		}
		if !fits_clock(self.refill_interval) {
			return Err(ConfigError::invalid("refill_interval", "exceeds the clock range"));
		}

		Ok(())
	}
}
impl Default for RateLimits {
	fn default() -> Self {
		Self {
			max_concurrent: 2,
			per_second: 1.8,
			per_hour: 1_200,
			refill_interval: Duration::from_secs(60 * 60),
		}
	}
}

// The scheduler adds both durations to monotonic instants; keep a full interval of headroom.
fn fits_clock(duration: Duration) -> bool {
	duration.checked_mul(2).and_then(|span| Instant::now().checked_add(span)).is_some()
}

/// Immutable client configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, PartialEq)]
pub struct ApiConfig {
	/// API base URL; endpoint paths are appended verbatim.
	pub base_url: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Timeout applied to every HTTP round trip.
	pub request_timeout: Duration,
	/// Scheduler limits.
	pub limits: RateLimits,
}
impl ApiConfig {
	/// Default per-request timeout.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

	/// Creates a new builder.
	pub fn builder() -> ApiConfigBuilder {
		ApiConfigBuilder::default()
	}

	/// Builds a configuration from the `FT_API_*` environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Builds a configuration from an arbitrary variable lookup.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&'static str) -> Option<String>,
	{
		let required = |name| lookup(name).filter(|v| !v.trim().is_empty());
		let endpoint = required(ENV_ENDPOINT).ok_or(ConfigError::Missing { name: ENV_ENDPOINT })?;
		let mut limits = RateLimits::default();

		if let Some(raw) = required(ENV_RATE_PER_SECOND) {
			limits.per_second = raw
				.trim()
				.parse()
				.map_err(|e| ConfigError::invalid(ENV_RATE_PER_SECOND, format!("{e}")))?;
		}
		if let Some(raw) = required(ENV_RATE_PER_HOUR) {
			limits.per_hour = raw
				.trim()
				.parse()
				.map_err(|e| ConfigError::invalid(ENV_RATE_PER_HOUR, format!("{e}")))?;
		}

		let mut builder = Self::builder().base_url_str(endpoint.trim())?.limits(limits);

		if let Some(id) = required(ENV_CLIENT_ID) {
			builder = builder.client_id(id);
		}
		if let Some(secret) = required(ENV_CLIENT_SECRET) {
			builder = builder.client_secret(secret);
		}

		builder.build().map_err(|err| match err {
			ConfigError::Missing { name: "client_id" } =>
				ConfigError::Missing { name: ENV_CLIENT_ID },
			ConfigError::Missing { name: "client_secret" } =>
				ConfigError::Missing { name: ENV_CLIENT_SECRET },
			other => other,
		})
	}

	/// Returns the base URL without a trailing slash, ready for path concatenation.
	pub fn base(&self) -> &str {
		self.base_url.as_str().trim_end_matches('/')
	}
}
impl Debug for ApiConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiConfig")
			.field("base_url", &self.base_url.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("request_timeout", &self.request_timeout)
			.field("limits", &self.limits)
			.finish()
	}
}

/// Builder for [`ApiConfig`].
#[derive(Clone, Debug, Default)]
pub struct ApiConfigBuilder {
	base_url: Option<Url>,
	client_id: Option<String>,
	client_secret: Option<TokenSecret>,
	request_timeout: Option<Duration>,
	limits: RateLimits,
}
impl ApiConfigBuilder {
	/// Sets the API base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = Some(url);

		self
	}

	/// Parses and sets the API base URL.
	pub fn base_url_str(self, url: &str) -> Result<Self, ConfigError> {
		let parsed = Url::parse(url)
			.map_err(|source| ConfigError::InvalidUrl { url: url.to_owned(), source })?;

		Ok(self.base_url(parsed))
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, id: impl Into<String>) -> Self {
		self.client_id = Some(id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Overrides the per-request timeout (defaults to 25 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Replaces the scheduler limits.
	pub fn limits(mut self, limits: RateLimits) -> Self {
		self.limits = limits;

		self
	}

	/// Validates the collected values and produces an [`ApiConfig`].
	pub fn build(self) -> Result<ApiConfig, ConfigError> {
		let base_url = self.base_url.ok_or(ConfigError::Missing { name: "base_url" })?;

		if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
			return Err(ConfigError::invalid("base_url", "must be an absolute http(s) URL"));
		}
		if base_url.query().is_some() {
			return Err(ConfigError::invalid("base_url", "must not carry a query string"));
		}

		let client_id = self
			.client_id
			.filter(|id| !id.trim().is_empty())
			.ok_or(ConfigError::Missing { name: "client_id" })?;
		let client_secret = self
			.client_secret
			.filter(|secret| !secret.is_blank())
			.ok_or(ConfigError::Missing { name: "client_secret" })?;
		let request_timeout = self.request_timeout.unwrap_or(ApiConfig::DEFAULT_TIMEOUT);

		if request_timeout.is_zero() {
			return Err(ConfigError::invalid("request_timeout", "must be non-zero"));
		}

		self.limits.validate()?;

		Ok(ApiConfig { base_url, client_id, client_secret, request_timeout, limits: self.limits })
	}
}

mod duration_secs {
	// std
	use std::time::Duration;
	// crates.io
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_u64(value.as_secs())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		u64::deserialize(deserializer).map(Duration::from_secs)
	}
}
