//! Plan transitions. [`reduce`] is pure; [`PlanStore`] applies a transition and
//! writes the resulting snapshot, ignoring write failures.

use chrono::NaiveDate;

use crate::clock::Now;
use crate::storage::Storage;
use crate::time_utils::MinuteOfDay;
use crate::types::{Medication, Plan, PlanItem, Section};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    MarkTaken(Medication),
    MarkDone { section: Section, done_key: String },
    SetFriendName(String),
    SetCharacterName(String),
    SetEveryHours { med: Medication, hours: u32 },
    SetStart { med: Medication, start: MinuteOfDay },
    SetSlot { section: Section, index: usize, time: MinuteOfDay },
    SetEnabled { item: PlanItem, enabled: bool },
    ToggleDarkMode,
    DismissIntro,
    Notified { stamp: String },
}

/// At most one increment per calendar day.
pub fn bump_streak(plan: &Plan, today: NaiveDate) -> Plan {
    if plan.last_streak_date == Some(today) {
        return plan.clone();
    }
    Plan {
        streak: plan.streak + 1,
        last_streak_date: Some(today),
        ..plan.clone()
    }
}

pub fn reduce(plan: &Plan, action: Action, now: &Now) -> Plan {
    let mut next = plan.clone();
    match action {
        Action::MarkTaken(med) => {
            next.med_mut(med).last_taken = Some(now.instant);
            return bump_streak(&next, now.today);
        }
        Action::MarkDone { section, done_key } => {
            next.task_mut(section).done.insert(done_key, true);
            return bump_streak(&next, now.today);
        }
        Action::SetFriendName(name) => next.friend_name = name,
        Action::SetCharacterName(name) => next.character_name = name,
        Action::SetEveryHours { med, hours } => next.med_mut(med).every_hours = hours,
        Action::SetStart { med, start } => next.med_mut(med).start = start,
        Action::SetSlot { section, index, time } => {
            // Out-of-range indices would break the fixed slot count.
            if let Some(slot) = next.task_mut(section).times.get_mut(index) {
                *slot = time;
            }
        }
        Action::SetEnabled { item, enabled } => match item {
            PlanItem::Med(med) => next.med_mut(med).enabled = enabled,
            PlanItem::Task(section) => next.task_mut(section).enabled = enabled,
        },
        Action::ToggleDarkMode => next.dark_mode = !next.dark_mode,
        Action::DismissIntro => next.intro_seen = true,
        Action::Notified { stamp } => next.last_notified_at_minute = Some(stamp),
    }
    next
}

/// Owns the current plan and mirrors every change to [`Storage`].
pub struct PlanStore {
    storage: Storage,
    plan: Plan,
}

impl PlanStore {
    /// Loads the persisted plan, or defaults.
    pub fn open(storage: Storage) -> Self {
        let plan = storage.load_or_default();
        Self { storage, plan }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Re-read the snapshot; other invocations may have written it.
    ///
    /// An unreadable or missing snapshot keeps the live plan. The notification
    /// stamp never moves backwards: stamps sort chronologically, so a snapshot
    /// that missed a failed write cannot re-open a minute already notified.
    pub fn reload(&mut self) {
        let mut fresh = match self.storage.read() {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                tracing::debug!(path = %self.storage.path().display(), "snapshot missing, keeping live plan");
                return;
            }
            Err(e) => {
                tracing::warn!(path = %self.storage.path().display(), error = %e, "unreadable snapshot, keeping live plan");
                return;
            }
        };
        if self.plan.last_notified_at_minute > fresh.last_notified_at_minute {
            fresh.last_notified_at_minute = self.plan.last_notified_at_minute.take();
        }
        self.plan = fresh;
    }

    pub fn dispatch(&mut self, action: Action, now: &Now) -> &Plan {
        tracing::debug!(?action, "dispatch");
        let next = reduce(&self.plan, action, now);
        self.replace(next)
    }

    /// Swap in a new snapshot and persist it.
    pub fn replace(&mut self, plan: Plan) -> &Plan {
        self.plan = plan;
        self.persist();
        &self.plan
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.plan) {
            tracing::warn!(path = %self.storage.path().display(), error = %e, "failed to persist plan");
        }
    }

    /// Forget everything and start over with onboarding.
    pub fn reset_all(&mut self) -> &Plan {
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "failed to clear snapshot");
        }
        self.plan = Plan::default();
        self.persist();
        &self.plan
    }
}
