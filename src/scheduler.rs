//! Shared rate and concurrency gate for outbound calls.
//!
//! Every unit of work waits until three constraints hold at once: a free concurrency slot,
//! the minimum spacing since the previous dispatch, and a non-empty hourly reservoir. Work is
//! admitted strictly in submission order: the head of the queue holds an admission guard while
//! it waits, so later submissions cannot overtake it. The reservoir is reset to full capacity
//! at fixed interval boundaries measured from scheduler creation, independent of how much of
//! it was consumed.
//!
//! Timing uses [`tokio::time::Instant`], so tests can drive the scheduler with a paused clock.

// std
use std::{
	sync::atomic::{AtomicUsize, Ordering},
	time::Duration,
};
// crates.io
use tokio::{
	sync::{Mutex as FifoMutex, Semaphore},
	time::{self, Instant},
};
// self
use crate::{_prelude::*, config::RateLimits, error::ConfigError};

/// Point-in-time view of the scheduler counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerSnapshot {
	/// Units currently executing.
	pub active: usize,
	/// Units submitted but not yet dispatched.
	pub queued: usize,
	/// Dispatches left before the reservoir runs dry.
	pub available_quota: u32,
	/// Time until the next reservoir refill.
	pub next_refill_in: Duration,
}

/// FIFO scheduler enforcing concurrency, spacing, and reservoir limits.
pub struct Scheduler {
	limits: RateLimits,
	min_spacing: Duration,
	slots: Semaphore,
	admission: FifoMutex<()>,
	state: Mutex<ReservoirState>,
	queued: AtomicUsize,
}
impl Scheduler {
	/// Creates a scheduler with validated limits.
	pub fn new(limits: RateLimits) -> Result<Self, ConfigError> {
		limits.validate()?;

		let next_refill = Instant::now()
			.checked_add(limits.refill_interval)
			.ok_or_else(|| ConfigError::invalid("refill_interval", "exceeds the clock range"))?;

		Ok(Self {
			min_spacing: limits.min_spacing(),
			slots: Semaphore::new(limits.max_concurrent),
			admission: FifoMutex::new(()),
			state: Mutex::new(ReservoirState {
				available: limits.per_hour,
				next_refill,
				last_dispatch: None,
			}),
			queued: AtomicUsize::new(0),
			limits,
		})
	}

	/// Returns the limits this scheduler enforces.
	pub fn limits(&self) -> &RateLimits {
		&self.limits
	}

	/// Waits for a slot, then runs `work` and returns its output.
	///
	/// `work` is only invoked once the unit is dispatched, so any request it builds observes
	/// state (tokens, clocks) as of dispatch rather than submission.
	pub async fn schedule<F, Fut, T>(&self, work: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		let _permit = {
			let _queued = QueuedGuard::enter(&self.queued);
			let _admission = self.admission.lock().await;
			// The semaphore is never closed.
			let permit = self.slots.acquire().await.ok();

			self.wait_for_dispatch().await;

			permit
		};

		work().await
	}

	/// Returns the current counters.
	pub fn snapshot(&self) -> SchedulerSnapshot {
		let now = Instant::now();
		let mut state = self.state.lock();

		state.refill_if_due(now, &self.limits);

		SchedulerSnapshot {
			active: self.limits.max_concurrent - self.slots.available_permits(),
			queued: self.queued.load(Ordering::Relaxed),
			available_quota: state.available,
			next_refill_in: state.next_refill.saturating_duration_since(now),
		}
	}

	async fn wait_for_dispatch(&self) {
		loop {
			let deadline = {
				let now = Instant::now();
				let mut state = self.state.lock();

				state.refill_if_due(now, &self.limits);

				match state.try_dispatch(now, self.min_spacing) {
					None => return,
					Some(deadline) => deadline,
				}
			};

			time::sleep_until(deadline).await;
		}
	}
}
impl Debug for Scheduler {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Scheduler")
			.field("limits", &self.limits)
			.field("snapshot", &self.snapshot())
			.finish()
	}
}

#[derive(Debug)]
struct ReservoirState {
	available: u32,
	next_refill: Instant,
	last_dispatch: Option<Instant>,
}
impl ReservoirState {
	fn refill_if_due(&mut self, now: Instant, limits: &RateLimits) {
		if now < self.next_refill {
			return;
		}

		self.available = limits.per_hour;

		while self.next_refill <= now {
			self.next_refill += limits.refill_interval;
		}
	}

	/// Consumes one unit of quota and returns `None`, or returns the instant to retry at.
	fn try_dispatch(&mut self, now: Instant, min_spacing: Duration) -> Option<Instant> {
		if self.available == 0 {
			return Some(self.next_refill);
		}
		if let Some(ready_at) = self.last_dispatch.map(|last| last + min_spacing)
			&& now < ready_at
		{
			return Some(ready_at);
		}

		self.available -= 1;
		self.last_dispatch = Some(now);

		None
	}
}

struct QueuedGuard<'a>(&'a AtomicUsize);
impl<'a> QueuedGuard<'a> {
	fn enter(counter: &'a AtomicUsize) -> Self {
		counter.fetch_add(1, Ordering::Relaxed);

		Self(counter)
	}
}
impl Drop for QueuedGuard<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::Relaxed);
	}
}
