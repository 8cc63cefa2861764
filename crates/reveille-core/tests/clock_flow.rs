//! End-to-end flows over real file storage: alarm lifecycle with trigger
//! upkeep, restart resync, and the countdown ledger against the in-memory
//! scheduler.

use std::sync::{Arc, Mutex};

use reveille_core::{
    rule, AlarmStore, InMemoryScheduler, JsonFileStore, RuleSet, TimerLedger, TriggerScheduler,
    Weekday,
};

fn harness(dir: &tempfile::TempDir) -> (Arc<JsonFileStore>, Arc<InMemoryScheduler>) {
    (
        Arc::new(JsonFileStore::with_base(dir.path())),
        Arc::new(InMemoryScheduler::new()),
    )
}

#[test]
fn alarm_lifecycle_keeps_triggers_and_disk_in_step() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, scheduler) = harness(&dir);
    let store = AlarmStore::new(storage.clone(), scheduler.clone());

    let mut alarm = store.add("AM 6:30", "Weekdays", true);
    assert_eq!(scheduler.pending_len(), 5);

    // Narrowing the rule narrows the trigger set.
    alarm.subtitle = rule::encode(RuleSet::single(Weekday::Sat));
    store.update(alarm.clone());
    assert_eq!(
        scheduler.pending_ids(),
        vec![format!("alarm.{}.weekday.7", alarm.id)]
    );

    store.toggle(alarm.id);
    assert_eq!(scheduler.pending_len(), 0);

    store.remove(alarm.id);
    assert!(store.is_empty());

    // The empty collection is what's on disk.
    let raw = std::fs::read_to_string(dir.path().join("alarms.json")).unwrap();
    assert_eq!(raw, "[]");
}

#[test]
fn restart_resync_rebuilds_triggers_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, scheduler) = harness(&dir);

    {
        let store = AlarmStore::new(storage.clone(), scheduler.clone());
        store.add("AM 7:00", "Weekend", true);
        store.add("PM 10:00", "Today", false);
    }

    // Fresh process: stale scheduler state, collection loaded from disk.
    let (reread, fresh_scheduler) = (storage, Arc::new(InMemoryScheduler::new()));
    let store = AlarmStore::new(reread, fresh_scheduler.clone());
    store.load();
    assert_eq!(store.len(), 2);

    store.resync();
    // Only the enabled weekend alarm is registered: Sunday and Saturday.
    let ids = fresh_scheduler.pending_ids();
    assert_eq!(ids.len(), 2);
    assert!(ids.iter().any(|id| id.ends_with(".weekday.1")));
    assert!(ids.iter().any(|id| id.ends_with(".weekday.7")));
}

#[test]
fn countdown_runs_to_completion_and_reports_once() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, scheduler) = harness(&dir);
    let ledger = TimerLedger::new(storage, scheduler.clone());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    ledger.subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.len()));

    let egg = ledger.add(3.0, "egg");
    assert_eq!(scheduler.pending_ids(), vec![egg.id.to_string()]);

    assert!(ledger.tick().is_empty());
    assert!(ledger.tick().is_empty());
    let finished = ledger.tick();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].label, "egg");

    // Trigger cancelled on completion, ledger empty, observers saw the
    // add and each tick's snapshot.
    assert_eq!(scheduler.pending_len(), 0);
    assert!(ledger.is_empty());
    assert_eq!(seen.lock().unwrap().as_slice(), &[1, 1, 1, 0]);

    assert!(ledger.tick().is_empty());
}

#[test]
fn backgrounded_timer_is_swept_after_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let (storage, scheduler) = harness(&dir);
    let ledger = TimerLedger::new(storage.clone(), scheduler.clone());

    let tea = ledger.add(60.0, "tea");
    let toast = ledger.add(90.0, "toast");

    // Simulate the platform firing the tea trigger while backgrounded.
    assert!(scheduler.mark_delivered(&tea.id.to_string()));

    ledger.sweep_delivered();
    let remaining: Vec<String> = ledger
        .snapshot()
        .iter()
        .map(|record| record.label.clone())
        .collect();
    assert_eq!(remaining, vec!["toast".to_string()]);
    assert!(scheduler.delivered_ids().is_empty());

    // The sweep result is also the persisted state.
    let raw = std::fs::read_to_string(dir.path().join("savedTimers.json")).unwrap();
    assert!(raw.contains(&toast.id.to_string()));
    assert!(!raw.contains(&tea.id.to_string()));
}
