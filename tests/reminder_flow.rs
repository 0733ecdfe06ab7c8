use tooth_time::clock::{Clock, FixedClock};
use tooth_time::notify::{DispatchOutcome, RecordingNotifier};
use tooth_time::schedule::derive;
use tooth_time::storage::Storage;
use tooth_time::store::{Action, PlanStore};
use tooth_time::types::{ItemKind, Medication, Section};
use tooth_time::watch::Watcher;

fn clock(rfc3339: &str) -> FixedClock {
    FixedClock::at(rfc3339).expect("valid timestamp")
}

#[test]
fn marking_a_slot_done_flips_only_todays_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlanStore::open(Storage::in_dir(dir.path()));
    let now = clock("2024-05-01T10:00:00+00:00").now();

    let before = derive(store.plan(), &now);
    let slot = before.iter().find(|i| i.id == "rinse_10:30").unwrap().clone();
    assert_eq!(slot.mins, 30);
    assert!(!slot.is_done());

    let ItemKind::Timed { section, done_key, .. } = slot.kind.clone() else {
        panic!("rinse slot should be timed");
    };
    store.dispatch(Action::MarkDone { section, done_key }, &now);

    let after = derive(store.plan(), &now);
    let slot_after = after.iter().find(|i| i.id == "rinse_10:30").unwrap();
    assert_eq!(slot_after.mins, 30);
    assert!(slot_after.is_done());
    assert_eq!(store.plan().rinse.done.len(), 1);

    let tomorrow = clock("2024-05-02T10:00:00+00:00").now();
    let next_day = derive(store.plan(), &tomorrow);
    assert!(!next_day.iter().find(|i| i.id == "rinse_10:30").unwrap().is_done());
}

#[test]
fn taking_a_dose_moves_the_next_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlanStore::open(Storage::in_dir(dir.path()));
    let now = clock("2024-05-01T10:00:00+00:00").now();

    store.dispatch(Action::MarkTaken(Medication::Paracetamol), &now);
    let schedule = derive(store.plan(), &now);
    let dose = schedule.iter().find(|i| i.id == "paracetamol").unwrap();
    assert_eq!(dose.when.to_string(), "16:00");
    assert_eq!(dose.mins, 360);

    let reopened = PlanStore::open(Storage::in_dir(dir.path()));
    assert_eq!(reopened.plan().paracetamol.last_taken, Some(now.instant));
    assert_eq!(reopened.plan().streak, 1);
}

#[test]
fn streak_counts_distinct_days() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlanStore::open(Storage::in_dir(dir.path()));
    let day_one = clock("2024-05-01T09:31:00+00:00").now();
    let day_two = clock("2024-05-02T09:31:00+00:00").now();

    store.dispatch(Action::MarkTaken(Medication::Ibuprofen), &day_one);
    store.dispatch(
        Action::MarkDone {
            section: Section::Corsodyl,
            done_key: "2024-05-01_09:30".into(),
        },
        &day_one,
    );
    assert_eq!(store.plan().streak, 1);

    store.dispatch(Action::MarkTaken(Medication::Ibuprofen), &day_two);
    assert_eq!(store.plan().streak, 2);
}

#[test]
fn watcher_notifies_once_per_minute_and_again_next_minute_due() {
    let dir = tempfile::tempdir().unwrap();
    let mut seed = PlanStore::open(Storage::in_dir(dir.path()));
    let now = clock("2024-05-01T09:30:00+00:00").now();
    seed.dispatch(Action::SetCharacterName("Molar".into()), &now);

    let mut watcher = Watcher::new(
        PlanStore::open(Storage::in_dir(dir.path())),
        clock("2024-05-01T09:30:00+00:00"),
        RecordingNotifier::default(),
    );
    for _ in 0..4 {
        watcher.tick();
    }
    let sent = watcher.notifier().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Molar 🦷");
    assert_eq!(sent[0].1, "CORSODYL TIME! TAP DONE ✅");

    // A fresh process at the same minute sees the persisted stamp.
    let mut restarted = Watcher::new(
        PlanStore::open(Storage::in_dir(dir.path())),
        clock("2024-05-01T09:30:40+00:00"),
        RecordingNotifier::default(),
    );
    assert_eq!(restarted.tick().dispatch, DispatchOutcome::AlreadyNotified);
    assert!(restarted.notifier().sent().is_empty());
}

#[test]
fn corrupt_snapshot_starts_from_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::in_dir(dir.path());
    std::fs::write(storage.path(), b"\xff\xfe garbage").unwrap();

    let store = PlanStore::open(storage);
    assert_eq!(store.plan().character_name, "Toofi");
    assert_eq!(store.plan().streak, 0);
}
