use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;
use crate::time_utils::MinuteOfDay;

/// A dose repeated every `every_hours` from the last dose or the nominal start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalMed {
    pub enabled: bool,
    pub every_hours: u32,
    pub start: MinuteOfDay,
    #[serde(default)]
    pub last_taken: Option<DateTime<FixedOffset>>,
}

/// An action at fixed times of day, tracked per calendar date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedTask {
    pub enabled: bool,
    pub times: Vec<MinuteOfDay>,
    #[serde(default)]
    pub done: BTreeMap<String, bool>,
}

impl TimedTask {
    pub fn is_done(&self, done_key: &str) -> bool {
        self.done.get(done_key).copied().unwrap_or(false)
    }
}

/// The persisted root entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Plan {
    pub friend_name: String,
    pub character_name: String,
    pub paracetamol: IntervalMed,
    pub ibuprofen: IntervalMed,
    pub rinse: TimedTask,
    pub corsodyl: TimedTask,
    pub streak: u32,
    pub last_streak_date: Option<NaiveDate>,
    pub last_notified_at_minute: Option<String>,
    pub intro_seen: bool,
    pub dark_mode: bool,
}

fn hhmm(s: &str) -> MinuteOfDay {
    s.parse().unwrap_or(MinuteOfDay::MIDNIGHT)
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            friend_name: "Aishuu ♥️♥️".to_string(),
            character_name: "Toofi".to_string(),
            paracetamol: IntervalMed {
                enabled: true,
                every_hours: 6,
                start: hhmm("08:00"),
                last_taken: None,
            },
            ibuprofen: IntervalMed {
                enabled: true,
                every_hours: 8,
                start: hhmm("09:00"),
                last_taken: None,
            },
            rinse: TimedTask {
                enabled: true,
                times: vec![hhmm("10:30"), hhmm("15:30"), hhmm("21:30")],
                done: BTreeMap::new(),
            },
            corsodyl: TimedTask {
                enabled: true,
                times: vec![hhmm("09:30"), hhmm("21:00")],
                done: BTreeMap::new(),
            },
            streak: 0,
            last_streak_date: None,
            last_notified_at_minute: None,
            intro_seen: false,
            dark_mode: false,
        }
    }
}

impl Plan {
    pub fn med(&self, med: Medication) -> &IntervalMed {
        match med {
            Medication::Paracetamol => &self.paracetamol,
            Medication::Ibuprofen => &self.ibuprofen,
        }
    }

    pub fn med_mut(&mut self, med: Medication) -> &mut IntervalMed {
        match med {
            Medication::Paracetamol => &mut self.paracetamol,
            Medication::Ibuprofen => &mut self.ibuprofen,
        }
    }

    pub fn task(&self, section: Section) -> &TimedTask {
        match section {
            Section::Rinse => &self.rinse,
            Section::Corsodyl => &self.corsodyl,
        }
    }

    pub fn task_mut(&mut self, section: Section) -> &mut TimedTask {
        match section {
            Section::Rinse => &mut self.rinse,
            Section::Corsodyl => &mut self.corsodyl,
        }
    }

    /// Slot counts are fixed per task; anything else means the snapshot is not ours.
    pub fn check_invariants(&self) -> Result<(), String> {
        for section in Section::ALL {
            let len = self.task(section).times.len();
            if len != section.slot_count() {
                return Err(format!(
                    "{} has {len} time slots, expected {}",
                    section.key(),
                    section.slot_count()
                ));
            }
        }
        Ok(())
    }
}

/// Key of a fixed-time slot in a task's done map: `<ISO-date>_<HH:MM>`.
pub fn done_key(date: NaiveDate, slot: MinuteOfDay) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), slot)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medication {
    Paracetamol,
    Ibuprofen,
}

impl Medication {
    pub const ALL: [Medication; 2] = [Medication::Paracetamol, Medication::Ibuprofen];

    pub fn key(self) -> &'static str {
        match self {
            Medication::Paracetamol => "paracetamol",
            Medication::Ibuprofen => "ibuprofen",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Medication::Paracetamol => "PARACETAMOL",
            Medication::Ibuprofen => "IBUPROFEN",
        }
    }

    /// Interval bounds offered by the settings editor.
    pub fn interval_range(self) -> (u32, u32) {
        match self {
            Medication::Paracetamol => (4, 8),
            Medication::Ibuprofen => (6, 12),
        }
    }

    pub fn check_interval(self, hours: u32) -> Result<u32, InputError> {
        let (min, max) = self.interval_range();
        if (min..=max).contains(&hours) {
            Ok(hours)
        } else {
            Err(InputError::IntervalOutOfRange {
                med: self.key().to_string(),
                min,
                max,
                got: hours,
            })
        }
    }
}

impl fmt::Display for Medication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Medication {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paracetamol" => Ok(Medication::Paracetamol),
            "ibuprofen" => Ok(Medication::Ibuprofen),
            _ => Err(InputError::UnknownMedication(s.to_string())),
        }
    }
}

/// The plan field that owns a fixed-time task's done map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Rinse,
    Corsodyl,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Rinse, Section::Corsodyl];

    pub fn key(self) -> &'static str {
        match self {
            Section::Rinse => "rinse",
            Section::Corsodyl => "corsodyl",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Section::Rinse => "SALT RINSE",
            Section::Corsodyl => "CORSODYL",
        }
    }

    pub fn pending_subtitle(self) -> &'static str {
        match self {
            Section::Rinse => "3X/DAY",
            Section::Corsodyl => "AM/PM",
        }
    }

    pub fn slot_count(self) -> usize {
        match self {
            Section::Rinse => 3,
            Section::Corsodyl => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rinse" | "salt-rinse" => Ok(Section::Rinse),
            "corsodyl" => Ok(Section::Corsodyl),
            _ => Err(InputError::UnknownTask(s.to_string())),
        }
    }
}

/// Any schedulable entry of the plan, for enable/disable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanItem {
    Med(Medication),
    Task(Section),
}

impl FromStr for PlanItem {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(med) = s.parse::<Medication>() {
            return Ok(PlanItem::Med(med));
        }
        s.parse::<Section>()
            .map(PlanItem::Task)
            .map_err(|_| InputError::UnknownItem(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    Pill {
        med: Medication,
    },
    Timed {
        section: Section,
        #[serde(rename = "doneKey")]
        done_key: String,
        done: bool,
    },
}

/// One derived entry of the upcoming schedule. Recomputed every tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScheduleItem {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub when: MinuteOfDay,
    pub mins: i64,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ScheduleItem {
    pub fn is_done(&self) -> bool {
        matches!(self.kind, ItemKind::Timed { done: true, .. })
    }
}
