//! Current-time sampling. Everything downstream takes a [`Now`] so the
//! schedule logic never reads the wall clock itself.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Timelike};

use crate::time_utils::MinuteOfDay;

/// One sample of the host-local wall clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Now {
    pub today: NaiveDate,
    pub minute: MinuteOfDay,
    pub instant: DateTime<FixedOffset>,
}

impl Now {
    pub fn from_instant(instant: DateTime<FixedOffset>) -> Self {
        let minute = MinuteOfDay::from_hm(instant.hour(), instant.minute())
            .unwrap_or(MinuteOfDay::MIDNIGHT);
        Self {
            today: instant.date_naive(),
            minute,
            instant,
        }
    }

    /// The `<today>_<HH:MM>` stamp identifying this minute-tick.
    pub fn minute_stamp(&self) -> String {
        crate::types::done_key(self.today, self.minute)
    }
}

pub trait Clock {
    fn now(&self) -> Now;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Now {
        Now::from_instant(Local::now().fixed_offset())
    }
}

/// Always reports the same instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub Now);

impl FixedClock {
    /// `rfc3339` such as `2024-05-01T10:00:00+02:00`.
    pub fn at(rfc3339: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(rfc3339)
            .ok()
            .map(|dt| FixedClock(Now::from_instant(dt)))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Now {
        self.0
    }
}
