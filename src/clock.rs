//! Wall-clock sources used to stamp token assertions.

// self
use crate::_prelude::*;

/// Supplies the current time as whole seconds since the Unix epoch.
///
/// Every assertion reads the clock exactly once so `iat` and `exp` always agree. Implementations
/// must be safe to read concurrently and must not require mutation.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Current time in seconds since the Unix epoch.
	fn now_seconds(&self) -> i64;
}
impl<F> Clock for F
where
	F: Fn() -> i64 + Send + Sync,
{
	fn now_seconds(&self) -> i64 {
		self()
	}
}

/// Clock backed by the system's UTC wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now_seconds(&self) -> i64 {
		OffsetDateTime::now_utc().unix_timestamp()
	}
}

/// Clock frozen at a single instant; intended for deterministic tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub i64);
impl FixedClock {
	/// Freezes the clock at the provided instant.
	pub fn at(instant: OffsetDateTime) -> Self {
		Self(instant.unix_timestamp())
	}
}
impl Clock for FixedClock {
	fn now_seconds(&self) -> i64 {
		self.0
	}
}
