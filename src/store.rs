//! Process-local credential slot shared by every call of a client.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{_prelude::*, auth::Credential};

/// Holds at most one [`Credential`] and serializes its renewal.
///
/// Readers take a cheap clone of the current credential; renewal installs a brand-new value
/// and never edits the stored one. The async renewal guard lets exactly one caller hit the
/// token endpoint while concurrent callers wait and then reuse the freshly installed value.
#[derive(Debug, Default)]
pub struct TokenStore {
	slot: RwLock<Option<Credential>>,
	renewal: AsyncMutex<()>,
	metrics: RenewalMetrics,
}
impl TokenStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store pre-seeded with `credential`.
	pub fn with_credential(credential: Credential) -> Self {
		let store = Self::default();

		store.install(credential);

		store
	}

	/// Returns a clone of the current credential, if any.
	pub fn current(&self) -> Option<Credential> {
		self.slot.read().clone()
	}

	/// Replaces the current credential wholesale, returning the superseded one.
	pub fn install(&self, credential: Credential) -> Option<Credential> {
		self.slot.write().replace(credential)
	}

	/// Drops the current credential so the next call renews.
	pub fn clear(&self) -> Option<Credential> {
		self.slot.write().take()
	}

	/// Returns `true` when no credential is held or the held one is past its expiry at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.slot.read().as_ref().is_none_or(|credential| credential.is_expired_at(instant))
	}

	/// Checks staleness against the current UTC clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns the renewal counters.
	pub fn renewals(&self) -> &RenewalMetrics {
		&self.metrics
	}

	pub(crate) fn renewal_guard(&self) -> &AsyncMutex<()> {
		&self.renewal
	}
}

/// Thread-safe counters for token renewals.
#[derive(Debug, Default)]
pub struct RenewalMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RenewalMetrics {
	/// Returns the number of token acquisitions sent to the API.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of acquisitions that installed a credential.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of failed acquisitions.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}
