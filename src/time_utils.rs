use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InputError;

pub const MINUTES_PER_DAY: i64 = 1440;

/// A point on the 24-hour wheel, always in `0..=1439`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);

    /// Builds a minute-of-day from any minute count, wrapping into the day.
    pub fn wrapping(total: i64) -> Self {
        MinuteOfDay(total.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| MinuteOfDay((hour * 60 + minute) as u16))
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0) / 60
    }

    pub fn minute(self) -> u32 {
        u32::from(self.0) % 60
    }

    pub fn as_minutes(self) -> i64 {
        i64::from(self.0)
    }

    /// Minutes from `self` forward to the next occurrence of `to`, in `0..=1439`.
    pub fn minutes_until(self, to: MinuteOfDay) -> i64 {
        (to.as_minutes() - self.as_minutes()).rem_euclid(MINUTES_PER_DAY)
    }

    /// Advances by `delta` minutes (negative goes backwards), wrapping at midnight.
    pub fn add_minutes(self, delta: i64) -> Self {
        Self::wrapping(self.as_minutes() + delta)
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for MinuteOfDay {
    type Err = InputError;

    /// Parses a 24-hour "HH:MM" string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InputError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(bad());
        }
        if !h.bytes().chain(m.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        let hour: u32 = h.parse().map_err(|_| bad())?;
        let minute: u32 = m.parse().map_err(|_| bad())?;
        MinuteOfDay::from_hm(hour, minute).ok_or_else(bad)
    }
}

impl Serialize for MinuteOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MinuteOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// `(to - from) mod 1440` on "HH:MM" points.
pub fn minutes_between(from: MinuteOfDay, to: MinuteOfDay) -> i64 {
    from.minutes_until(to)
}

pub fn add_minutes(hhmm: MinuteOfDay, delta: i64) -> MinuteOfDay {
    hhmm.add_minutes(delta)
}

/// Human countdown: `NOW!`, `25 MIN`, `2H`, `2H 5M`.
pub fn pretty_in(mins: i64) -> String {
    if mins == 0 {
        return "NOW!".to_string();
    }
    if mins < 60 {
        return format!("{mins} MIN");
    }
    let (h, m) = (mins / 60, mins % 60);
    if m == 0 {
        format!("{h}H")
    } else {
        format!("{h}H {m}M")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> MinuteOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_formats_hhmm() {
        assert_eq!(t("08:05").to_string(), "08:05");
        assert_eq!(t("8:05").to_string(), "08:05");
        assert_eq!(t("23:59").as_minutes(), 1439);
        assert_eq!(t("00:00"), MinuteOfDay::MIDNIGHT);
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["24:00", "12:60", "1230", "12:3", "ab:cd", "", "-1:00", "12:345"] {
            assert!(bad.parse::<MinuteOfDay>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn minutes_between_same_time_is_zero() {
        for total in (0..MINUTES_PER_DAY).step_by(7) {
            let m = MinuteOfDay::wrapping(total);
            assert_eq!(minutes_between(m, m), 0);
        }
    }

    #[test]
    fn minutes_between_wraps_past_midnight() {
        assert_eq!(minutes_between(t("10:00"), t("10:30")), 30);
        assert_eq!(minutes_between(t("23:30"), t("00:15")), 45);
        assert_eq!(minutes_between(t("10:01"), t("10:00")), 1439);
    }

    #[test]
    fn minutes_between_stays_on_the_wheel() {
        for a in (0..MINUTES_PER_DAY).step_by(37) {
            for b in (0..MINUTES_PER_DAY).step_by(41) {
                let d = minutes_between(MinuteOfDay::wrapping(a), MinuteOfDay::wrapping(b));
                assert!((0..MINUTES_PER_DAY).contains(&d));
            }
        }
    }

    #[test]
    fn add_minutes_handles_negative_and_large_deltas() {
        assert_eq!(add_minutes(t("22:00"), 180), t("01:00"));
        assert_eq!(add_minutes(t("01:00"), -120), t("23:00"));
        assert_eq!(add_minutes(t("12:00"), 3 * 1440 + 1), t("12:01"));
        assert_eq!(add_minutes(t("12:00"), -5 * 1440), t("12:00"));
    }

    #[test]
    fn add_minutes_is_reversible() {
        let start = t("07:45");
        for d in [-100_000, -1441, -1, 0, 1, 59, 1440, 99_999] {
            assert_eq!(add_minutes(add_minutes(start, d), -d), start);
        }
    }

    #[test]
    fn pretty_in_formats_countdowns() {
        assert_eq!(pretty_in(0), "NOW!");
        assert_eq!(pretty_in(1), "1 MIN");
        assert_eq!(pretty_in(59), "59 MIN");
        assert_eq!(pretty_in(60), "1H");
        assert_eq!(pretty_in(125), "2H 5M");
        assert_eq!(pretty_in(1439), "23H 59M");
    }

    #[test]
    fn serde_uses_hhmm_strings() {
        let json = serde_json::to_string(&t("09:30")).unwrap();
        assert_eq!(json, "\"09:30\"");
        let back: MinuteOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("09:30"));
        assert!(serde_json::from_str::<MinuteOfDay>("\"25:00\"").is_err());
    }
}
