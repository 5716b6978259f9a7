//! Time provider for account timestamps
//!
//! Every save stamps the account with the current time. The [`Clock`] trait lets the
//! account codec read time from the system in production and from a controllable
//! [`FixedClock`] in tests.
//!
//! # Example
//!
//! ```
//! use safe_launcher::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! assert!(clock.now_millis() > 0);
//! ```

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(any(test, feature = "testing"))]
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// A time provider for account timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time as a UTC datetime, truncated to milliseconds.
    fn now_utc(&self) -> DateTime<Utc> {
        millis_to_datetime(self.now_millis())
    }
}

/// Converts a millisecond Unix timestamp into a UTC datetime.
///
/// Values outside chrono's representable range clamp to the epoch.
pub fn millis_to_datetime(millis: u64) -> DateTime<Utc> {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Converts a UTC datetime into a millisecond Unix timestamp.
///
/// Datetimes before the epoch clamp to zero.
pub fn datetime_to_millis(datetime: &DateTime<Utc>) -> u64 {
    u64::try_from(datetime.timestamp_millis()).unwrap_or(0)
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Test clock with auto-advancing time.
///
/// Each `now_millis()` call returns the current value and then advances by one
/// millisecond. Use `hold()` to freeze it.
///
/// ```
/// use safe_launcher::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// let t1 = clock.now_millis();
/// let t2 = clock.now_millis();
/// assert!(t2 > t1);
///
/// {
///     let _hold = clock.hold();
///     assert_eq!(clock.now_millis(), clock.now_millis());
/// }
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    state: Mutex<FixedClockState>,
}

#[cfg(any(test, feature = "testing"))]
struct FixedClockState {
    millis: u64,
    held: bool,
}

/// RAII guard that freezes a [`FixedClock`] while held.
#[cfg(any(test, feature = "testing"))]
pub struct ClockHold<'a>(&'a FixedClock);

#[cfg(any(test, feature = "testing"))]
impl Drop for ClockHold<'_> {
    fn drop(&mut self) {
        self.0.lock().held = false;
    }
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a new fixed clock with the given initial time in milliseconds.
    pub fn new(millis: u64) -> Self {
        Self {
            state: Mutex::new(FixedClockState {
                millis,
                held: false,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FixedClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hold the clock, preventing auto-advance until the guard is dropped.
    pub fn hold(&self) -> ClockHold<'_> {
        self.lock().held = true;
        ClockHold(self)
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.lock().millis += ms;
    }

    /// Set the clock to a specific time in milliseconds.
    ///
    /// Setting it backwards is allowed; the account codec still never moves a
    /// timestamp backwards.
    pub fn set(&self, ms: u64) {
        self.lock().millis = ms;
    }

    /// Get the current time without advancing.
    pub fn get(&self) -> u64 {
        self.lock().millis
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        let mut state = self.lock();
        let t = state.millis;
        if !state.held {
            state.millis += 1;
        }
        t
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1704067200000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("FixedClock")
            .field("millis", &state.millis)
            .field("held", &state.held)
            .finish()
    }
}
