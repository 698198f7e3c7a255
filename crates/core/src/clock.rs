// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction.
//!
//! Schedules are expressed in local wall-clock time, so the clock yields a
//! `NaiveDateTime` rather than an `Instant`.

use chrono::NaiveDateTime;

/// Source of the current local time
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the system's local time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::Clock;
    use chrono::{NaiveDate, NaiveDateTime};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Manually driven clock for deterministic tests
    #[derive(Clone, Debug)]
    pub struct FakeClock {
        now: Arc<Mutex<NaiveDateTime>>,
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FakeClock {
        /// Starts at 2025-01-01 09:00:00.
        pub fn new() -> Self {
            let start = NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .unwrap_or_default();
            Self::at(start)
        }

        pub fn at(now: NaiveDateTime) -> Self {
            Self {
                now: Arc::new(Mutex::new(now)),
            }
        }

        pub fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock();
            *now += by;
        }

        pub fn set(&self, to: NaiveDateTime) {
            *self.now.lock() = to;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> NaiveDateTime {
            *self.now.lock()
        }
    }
}
