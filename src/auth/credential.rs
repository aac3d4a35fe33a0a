//! Immutable access credential with a fixed lifetime.

// crates.io
use time::Duration;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Bearer access token plus the instant the API issued it.
///
/// A credential is never mutated; renewal installs a brand-new value in the
/// [`TokenStore`](crate::store::TokenStore) slot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Issuance instant, read from the token response or recorded on receipt.
	#[serde(with = "time::serde::timestamp")]
	pub created_at: OffsetDateTime,
}
impl Credential {
	/// Fixed lifetime granted to every access token.
	pub const LIFETIME: Duration = Duration::seconds(7_200);

	/// Creates a credential issued at `created_at`.
	pub fn new(access_token: impl Into<TokenSecret>, created_at: OffsetDateTime) -> Self {
		Self { access_token: access_token.into(), created_at }
	}

	/// Creates a credential from an issuance timestamp in Unix epoch seconds.
	pub fn from_epoch_seconds(
		access_token: impl Into<TokenSecret>,
		created_at: i64,
	) -> Result<Self, time::error::ComponentRange> {
		Ok(Self::new(access_token, OffsetDateTime::from_unix_timestamp(created_at)?))
	}

	/// Returns the deterministic expiry instant (`created_at + LIFETIME`).
	pub fn expires_at(&self) -> OffsetDateTime {
		self.created_at + Self::LIFETIME
	}

	/// Returns `true` once `instant` is strictly past the expiry instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant > self.expires_at()
	}

	/// Checks expiry against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Remaining validity at `instant`, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at() - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("created_at", &self.created_at)
			.field("expires_at", &self.expires_at())
			.finish()
	}
}
