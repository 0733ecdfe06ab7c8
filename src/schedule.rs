use chrono::Timelike;

use crate::clock::Now;
use crate::time_utils::MinuteOfDay;
use crate::types::{IntervalMed, ItemKind, Medication, Plan, ScheduleItem, Section, done_key};

/// Upper bound on interval steps when searching from the nominal start.
const NEXT_DOSE_GUARD: u32 = 50;

/// Next dose time of an interval medication and the minutes until it.
///
/// With a recorded dose only its time of day counts, read in the offset of
/// `now`: elapsed calendar days are ignored, so a dose taken yesterday at 08:00
/// behaves like one taken today.
pub fn next_dose(med: &IntervalMed, now: &Now) -> (MinuteOfDay, i64) {
    let every_min = i64::from(med.every_hours) * 60;
    let current = now.minute;

    if let Some(taken) = med.last_taken {
        let taken = taken.with_timezone(now.instant.offset());
        let taken_at =
            MinuteOfDay::from_hm(taken.hour(), taken.minute()).unwrap_or(MinuteOfDay::MIDNIGHT);
        let next = taken_at.add_minutes(every_min);
        return (next, current.minutes_until(next));
    }

    let mut candidate = med.start;
    let mut guard = 0;
    while current.minutes_until(candidate) > every_min && guard < NEXT_DOSE_GUARD {
        candidate = candidate.add_minutes(every_min);
        guard += 1;
    }
    (candidate, current.minutes_until(candidate))
}

fn pill_item(med: Medication, cfg: &IntervalMed, now: &Now) -> ScheduleItem {
    let (when, mins) = next_dose(cfg, now);
    ScheduleItem {
        id: med.key().to_string(),
        title: med.title().to_string(),
        subtitle: format!("EVERY {}H", cfg.every_hours),
        when,
        mins,
        kind: ItemKind::Pill { med },
    }
}

fn timed_items(plan: &Plan, section: Section, now: &Now, items: &mut Vec<ScheduleItem>) {
    let task = plan.task(section);
    if !task.enabled {
        return;
    }
    for &slot in &task.times {
        let key = done_key(now.today, slot);
        let done = task.is_done(&key);
        items.push(ScheduleItem {
            id: format!("{}_{}", section.key(), slot),
            title: section.title().to_string(),
            subtitle: if done {
                "DONE ✅".to_string()
            } else {
                section.pending_subtitle().to_string()
            },
            when: slot,
            mins: now.minute.minutes_until(slot),
            kind: ItemKind::Timed {
                section,
                done_key: key,
                done,
            },
        });
    }
}

/// Upcoming items ordered by minutes until due.
///
/// Ties keep construction order: paracetamol, ibuprofen, corsodyl slots, rinse
/// slots. Completed slots stay in the list with their countdown unchanged.
pub fn derive(plan: &Plan, now: &Now) -> Vec<ScheduleItem> {
    let mut items = Vec::with_capacity(7);

    for med in Medication::ALL {
        let cfg = plan.med(med);
        if cfg.enabled {
            items.push(pill_item(med, cfg, now));
        }
    }
    timed_items(plan, Section::Corsodyl, now, &mut items);
    timed_items(plan, Section::Rinse, now, &mut items);

    items.sort_by_key(|item| item.mins);
    items
}

/// Mascot mood derived from the top of the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood {
    Chill,
    Proud,
    Ouch,
}

/// Minutes at or under which an item counts as coming up soon.
pub const SOON_MINUTES: i64 = 20;

pub fn mood(top: Option<&ScheduleItem>) -> Mood {
    match top.map(|item| item.mins) {
        Some(0) => Mood::Ouch,
        Some(m) if m <= SOON_MINUTES => Mood::Proud,
        _ => Mood::Chill,
    }
}

pub fn badge(mins: i64) -> &'static str {
    match mins {
        0 => "NOW",
        m if m <= SOON_MINUTES => "SOON",
        _ => "OK",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use chrono::DateTime;

    fn t(s: &str) -> MinuteOfDay {
        s.parse().unwrap()
    }

    fn at(hhmm: &str) -> Now {
        FixedClock::at(&format!("2024-05-01T{hhmm}:00+00:00"))
            .unwrap()
            .now()
    }

    fn only_paracetamol(every_hours: u32, start: &str) -> Plan {
        let mut plan = Plan::default();
        plan.paracetamol.every_hours = every_hours;
        plan.paracetamol.start = t(start);
        plan.ibuprofen.enabled = false;
        plan.rinse.enabled = false;
        plan.corsodyl.enabled = false;
        plan
    }

    #[test]
    fn dose_due_at_start_time_is_now() {
        let plan = only_paracetamol(6, "08:00");
        let items = derive(&plan, &at("08:00"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].when, t("08:00"));
        assert_eq!(items[0].mins, 0);
    }

    #[test]
    fn dose_advances_to_next_slot_after_start() {
        let plan = only_paracetamol(6, "08:00");
        let items = derive(&plan, &at("10:00"));
        assert_eq!(items[0].when, t("14:00"));
        assert_eq!(items[0].mins, 240);
        assert_eq!(items[0].subtitle, "EVERY 6H");
    }

    #[test]
    fn dose_before_start_waits_for_start() {
        let plan = only_paracetamol(6, "08:00");
        let items = derive(&plan, &at("06:00"));
        assert_eq!(items[0].when, t("08:00"));
        assert_eq!(items[0].mins, 120);
    }

    #[test]
    fn last_taken_uses_time_of_day_only() {
        let mut plan = only_paracetamol(6, "08:00");
        plan.paracetamol.last_taken =
            Some(DateTime::parse_from_rfc3339("2024-04-28T08:00:00+00:00").unwrap());
        let items = derive(&plan, &at("10:00"));
        assert_eq!(items[0].when, t("14:00"));
        assert_eq!(items[0].mins, 240);
    }

    #[test]
    fn last_taken_wraps_past_midnight() {
        let mut plan = only_paracetamol(6, "08:00");
        plan.paracetamol.last_taken =
            Some(DateTime::parse_from_rfc3339("2024-05-01T21:30:00+00:00").unwrap());
        let items = derive(&plan, &at("22:00"));
        assert_eq!(items[0].when, t("03:30"));
        assert_eq!(items[0].mins, 330);
    }

    #[test]
    fn last_taken_is_read_in_the_current_offset() {
        let mut plan = only_paracetamol(6, "08:00");
        plan.paracetamol.last_taken =
            Some(DateTime::parse_from_rfc3339("2024-05-01T06:00:00Z").unwrap());
        let now = FixedClock::at("2024-05-01T10:00:00+02:00").unwrap().now();
        let items = derive(&plan, &now);
        assert_eq!(items[0].when, t("14:00"));
        assert_eq!(items[0].mins, 240);
    }

    #[test]
    fn zero_interval_is_bounded() {
        let plan = only_paracetamol(0, "08:00");
        let items = derive(&plan, &at("10:00"));
        assert_eq!(items[0].when, t("08:00"));
        assert_eq!(items[0].mins, 1320);
    }

    #[test]
    fn timed_slot_reports_countdown_and_completion() {
        let mut plan = Plan::default();
        plan.paracetamol.enabled = false;
        plan.ibuprofen.enabled = false;
        plan.corsodyl.enabled = false;
        let now = at("10:00");

        let items = derive(&plan, &now);
        let slot = items.iter().find(|i| i.id == "rinse_10:30").unwrap();
        assert_eq!(slot.mins, 30);
        assert_eq!(slot.subtitle, "3X/DAY");
        assert!(!slot.is_done());

        plan.rinse.done.insert("2024-05-01_10:30".into(), true);
        let items = derive(&plan, &now);
        let slot = items.iter().find(|i| i.id == "rinse_10:30").unwrap();
        assert_eq!(slot.mins, 30);
        assert_eq!(slot.subtitle, "DONE ✅");
        assert!(slot.is_done());
    }

    #[test]
    fn yesterdays_done_flags_are_ignored() {
        let mut plan = Plan::default();
        plan.rinse.done.insert("2024-04-30_10:30".into(), true);
        let items = derive(&plan, &at("10:00"));
        let slot = items.iter().find(|i| i.id == "rinse_10:30").unwrap();
        assert!(!slot.is_done());
    }

    #[test]
    fn completed_slot_due_now_stays_listed() {
        let mut plan = Plan::default();
        plan.corsodyl.done.insert("2024-05-01_09:30".into(), true);
        let items = derive(&plan, &at("09:30"));
        assert_eq!(items[0].id, "corsodyl_09:30");
        assert_eq!(items[0].mins, 0);
        assert!(items[0].is_done());
    }

    #[test]
    fn disabled_items_are_skipped() {
        let mut plan = Plan::default();
        plan.ibuprofen.enabled = false;
        plan.rinse.enabled = false;
        let ids: Vec<_> = derive(&plan, &at("12:00")).into_iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.iter().any(|id| id == "ibuprofen" || id.starts_with("rinse_")));
    }

    #[test]
    fn schedule_is_sorted_and_stable() {
        let mut plan = Plan::default();
        // Everything due at 09:30 so only construction order separates them.
        plan.paracetamol.start = t("09:30");
        plan.ibuprofen.start = t("09:30");
        plan.corsodyl.times = vec![t("09:30"), t("09:30")];
        plan.rinse.times = vec![t("09:30"), t("12:00"), t("09:30")];

        let items = derive(&plan, &at("09:30"));
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "paracetamol",
                "ibuprofen",
                "corsodyl_09:30",
                "corsodyl_09:30",
                "rinse_09:30",
                "rinse_09:30",
                "rinse_12:00"
            ]
        );
        assert!(items.windows(2).all(|w| w[0].mins <= w[1].mins));
    }

    #[test]
    fn default_plan_ordering_at_midday() {
        let items = derive(&Plan::default(), &at("12:00"));
        assert!(items.windows(2).all(|w| w[0].mins <= w[1].mins));
        assert!(items.iter().all(|i| (0..1440).contains(&i.mins)));
        assert_eq!(items[0].id, "paracetamol");
        assert_eq!(items[0].when, t("14:00"));
        assert_eq!(items.len(), 7);
    }

    #[test]
    fn mood_and_badge_follow_the_countdown() {
        let plan = only_paracetamol(6, "08:00");
        assert_eq!(mood(derive(&plan, &at("08:00")).first()), Mood::Ouch);
        assert_eq!(mood(derive(&plan, &at("07:45")).first()), Mood::Proud);
        assert_eq!(mood(derive(&plan, &at("07:00")).first()), Mood::Chill);
        assert_eq!(mood(None), Mood::Chill);
        assert_eq!(badge(0), "NOW");
        assert_eq!(badge(20), "SOON");
        assert_eq!(badge(21), "OK");
    }
}
