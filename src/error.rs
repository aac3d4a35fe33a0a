//! Client-level error types shared across the call pipeline, token renewal, and configuration.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by every public call.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The API answered with a status outside the success range.
	#[error("API said: {status_text} for {url}.")]
	HttpStatus {
		/// HTTP status code.
		status: u16,
		/// Canonical reason phrase for the status.
		status_text: String,
		/// Fully constructed request URL.
		url: String,
	},
	/// The API answered with a success status but the JSON body carries an `error` field.
	#[error("API returned an error body: {body}.")]
	ApiBody {
		/// Parsed response body, verbatim.
		body: Value,
	},
	/// A success response could not be parsed as JSON.
	#[error("API returned a body that is not valid JSON for {url}.")]
	Decode {
		/// Fully constructed request URL.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// The token endpoint answered with a payload lacking the expected fields.
	#[error("Token endpoint returned an unexpected payload.")]
	TokenResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Renewing the access token failed; the triggering call was aborted.
	#[error("Access token acquisition failed.")]
	TokenAcquisition {
		/// Failure raised by the token call.
		#[source]
		source: Box<Error>,
	},
	/// The access token still looked stale right after a successful renewal.
	#[error("Access token is still expired after renewal; aborting call to {endpoint}.")]
	RetryExhausted {
		/// Endpoint path of the aborted call.
		endpoint: String,
	},
}
impl Error {
	/// Wraps a failure raised while acquiring a token.
	pub fn token_acquisition(source: Error) -> Self {
		Self::TokenAcquisition { source: Box::new(source) }
	}

	/// Returns the HTTP status code carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::HttpStatus { status, .. } => Some(*status),
			Self::TokenAcquisition { source } => source.status(),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A URL could not be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending value.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required configuration value was not provided.
	#[error("Missing required configuration value `{name}`.")]
	Missing {
		/// Field or environment variable name.
		name: &'static str,
	},
	/// A configuration value is present but unusable.
	#[error("Configuration value `{name}` is invalid: {reason}.")]
	Invalid {
		/// Field or environment variable name.
		name: &'static str,
		/// Why the value was rejected.
		reason: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
		Self::Invalid { name, reason: reason.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded its timeout.
	#[error("Request timed out while calling the API.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
