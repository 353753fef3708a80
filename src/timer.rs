//! Booster timer store: at most one timer, status derived from elapsed time.
//!
//! ```text
//!   start ──▶ Active ──(elapsed ≥ target, seen by query)──▶ Ready
//!               │                                           │
//!               └──── complete / force_complete ────────────┴──▶ removed
//! ```
//!
//! Readiness is discovered lazily on read. Nothing schedules a transition, so
//! the app can be closed for days and the next `query` is still correct.

use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::console;
use crate::error::BoosterError;
use crate::ids::IdGenerator;
use crate::model::{Timer, TimerStatus};
use crate::storage::Persistence;
use crate::time::{elapsed_hours, Clock};

pub struct TimerStore {
    persistence: Persistence,
    clock: Rc<dyn Clock>,
    ids: Rc<IdGenerator>,
}

impl TimerStore {
    pub fn new(persistence: Persistence, clock: Rc<dyn Clock>, ids: Rc<IdGenerator>) -> Self {
        Self {
            persistence,
            clock,
            ids,
        }
    }

    /// Start a timer. Fails if one is already stored, ready or not.
    pub fn start(&self, hours: f64, booster_type: &str) -> Result<Timer, BoosterError> {
        if !hours.is_finite() || hours <= 0.0 {
            return Err(BoosterError::InvalidDuration(hours));
        }
        let mut state = self.persistence.load();
        if state.timer.is_some() {
            console::log("[timer] start rejected: a timer is already active");
            return Err(BoosterError::AlreadyActiveTimer);
        }

        let now = self.clock.now();
        let timer = Timer {
            id: self.ids.next_tracked(now, &mut state.id_seq),
            start_time: now,
            target_delay_hours: hours,
            original_hours: hours,
            status: TimerStatus::Active,
            booster_type: booster_type.to_string(),
        };
        state.timer = Some(timer.clone());
        self.persistence.save(&state);
        console::log(&format!("[timer] started {} ({}h, {})", timer.id, hours, booster_type));
        Ok(timer)
    }

    /// Current timers (zero or one) with freshly computed status.
    /// Persists the active → ready flip when it happens.
    pub fn query(&self) -> Vec<Timer> {
        let mut state = self.persistence.load();
        let Some(timer) = state.timer.as_mut() else {
            return Vec::new();
        };

        let now = self.clock.now();
        if refresh_status(timer, now) {
            let snapshot = timer.clone();
            self.persistence.save(&state);
            console::log(&format!("[timer] {} is ready", snapshot.id));
            return vec![snapshot];
        }
        vec![timer.clone()]
    }

    /// Stored timer with the given id, status refreshed.
    pub fn find(&self, id: &str) -> Option<Timer> {
        self.query().into_iter().find(|t| t.id == id)
    }

    /// Remove the timer with `id`. Unknown ids are a no-op returning false.
    pub fn complete(&self, id: &str) -> bool {
        let mut state = self.persistence.load();
        match &state.timer {
            Some(t) if t.id == id => {
                state.timer = None;
                self.persistence.save(&state);
                console::log(&format!("[timer] {id} completed"));
                true
            }
            _ => {
                console::warn(&format!("[timer] complete: id not found: {id}"));
                false
            }
        }
    }

    /// Early exit ("open now"). Same as `complete`; readiness is not required.
    pub fn force_complete(&self, id: &str) -> bool {
        self.complete(id)
    }
}

/// Flip `Active` to `Ready` once the target has elapsed. Returns true on a flip.
/// A ready timer stays ready even if the clock moves backwards.
pub fn refresh_status(timer: &mut Timer, now: DateTime<Utc>) -> bool {
    if timer.status == TimerStatus::Active
        && elapsed_hours(timer.start_time, now) >= timer.target_delay_hours
    {
        timer.status = TimerStatus::Ready;
        return true;
    }
    false
}

/// Whole seconds until the timer's end, floored at zero. An end past
/// chrono's range reads as `u64::MAX`.
pub fn remaining_seconds(timer: &Timer, now: DateTime<Utc>) -> u64 {
    match timer.end_time() {
        Some(end) => ((end - now).num_milliseconds().max(0) / 1000) as u64,
        None => u64::MAX,
    }
}

/// Share of the wait that has passed, 0–100.
pub fn progress_percent(timer: &Timer, now: DateTime<Utc>) -> f64 {
    if timer.target_delay_hours <= 0.0 {
        return 100.0;
    }
    let pct = elapsed_hours(timer.start_time, now) / timer.target_delay_hours * 100.0;
    pct.clamp(0.0, 100.0)
}

/// `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_time_remaining(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::time::ManualClock;
    use chrono::{Duration, TimeZone};

    struct Fixture {
        clock: Rc<ManualClock>,
        store: TimerStore,
        persistence: Persistence,
    }

    fn fixture() -> Fixture {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        ));
        let persistence = Persistence::new(Rc::new(MemoryStorage::new()));
        let store = TimerStore::new(persistence.clone(), clock.clone(), Rc::new(IdGenerator::new()));
        Fixture {
            clock,
            store,
            persistence,
        }
    }

    #[test]
    fn start_creates_active_timer() {
        let f = fixture();
        let timer = f.store.start(4.0, "humanoid").unwrap();
        assert_eq!(timer.status, TimerStatus::Active);
        assert_eq!(timer.start_time, f.clock.now());
        assert!((timer.original_hours - 4.0).abs() < f64::EPSILON);
        assert_eq!(f.persistence.load().timer, Some(timer));
    }

    #[test]
    fn second_start_rejected() {
        let f = fixture();
        let first = f.store.start(4.0, "humanoid").unwrap();
        assert_eq!(
            f.store.start(8.0, "weapon").unwrap_err(),
            BoosterError::AlreadyActiveTimer
        );
        assert_eq!(f.persistence.load().timer, Some(first));
    }

    #[test]
    fn start_rejected_while_ready() {
        let f = fixture();
        f.store.start(1.0, "humanoid").unwrap();
        f.clock.advance_hours(2.0);
        assert_eq!(f.store.query()[0].status, TimerStatus::Ready);
        assert!(f.store.start(1.0, "humanoid").is_err());
    }

    #[test]
    fn invalid_durations_rejected() {
        let f = fixture();
        for hours in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                f.store.start(hours, "humanoid"),
                Err(BoosterError::InvalidDuration(_))
            ));
        }
        assert!(f.store.query().is_empty());
    }

    #[test]
    fn query_empty_without_timer() {
        let f = fixture();
        assert!(f.store.query().is_empty());
    }

    #[test]
    fn query_flips_exactly_at_target() {
        let f = fixture();
        f.store.start(4.0, "humanoid").unwrap();

        f.clock.advance(Duration::hours(4) - Duration::milliseconds(1));
        assert_eq!(f.store.query()[0].status, TimerStatus::Active);
        assert_eq!(f.persistence.load().timer.unwrap().status, TimerStatus::Active);

        f.clock.advance(Duration::milliseconds(1));
        assert_eq!(f.store.query()[0].status, TimerStatus::Ready);
        assert_eq!(f.persistence.load().timer.unwrap().status, TimerStatus::Ready);
    }

    #[test]
    fn ready_never_reverts() {
        let f = fixture();
        let start = f.clock.now();
        f.store.start(1.0, "humanoid").unwrap();
        f.clock.advance_hours(1.0);
        assert_eq!(f.store.query()[0].status, TimerStatus::Ready);

        f.clock.set(start);
        assert_eq!(f.store.query()[0].status, TimerStatus::Ready);
    }

    #[test]
    fn long_gap_between_reads() {
        let f = fixture();
        f.store.start(24.0, "weapon").unwrap();
        f.clock.advance(Duration::days(30));
        let timers = f.store.query();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].status, TimerStatus::Ready);
    }

    #[test]
    fn complete_removes_and_is_idempotent() {
        let f = fixture();
        let timer = f.store.start(4.0, "humanoid").unwrap();
        assert!(!f.store.complete("nope"));
        assert_eq!(f.store.query().len(), 1);
        assert!(f.store.complete(&timer.id));
        assert!(f.store.query().is_empty());
        assert!(!f.store.complete(&timer.id));
    }

    #[test]
    fn force_complete_while_active() {
        let f = fixture();
        let timer = f.store.start(12.0, "humanoid").unwrap();
        assert!(f.store.force_complete(&timer.id));
        assert!(f.store.start(4.0, "humanoid").is_ok());
    }

    #[test]
    fn ids_not_reused_in_same_instant() {
        let f = fixture();
        let a = f.store.start(4.0, "humanoid").unwrap();
        f.store.complete(&a.id);
        let b = f.store.start(4.0, "humanoid").unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn find_by_id() {
        let f = fixture();
        let timer = f.store.start(4.0, "humanoid").unwrap();
        assert_eq!(f.store.find(&timer.id).map(|t| t.id), Some(timer.id));
        assert!(f.store.find("other").is_none());
    }

    #[test]
    fn display_helpers() {
        let f = fixture();
        let timer = f.store.start(2.0, "humanoid").unwrap();
        let now = f.clock.now();
        assert_eq!(remaining_seconds(&timer, now), 7200);
        assert!(progress_percent(&timer, now).abs() < f64::EPSILON);

        let later = now + Duration::minutes(30);
        assert_eq!(remaining_seconds(&timer, later), 5400);
        assert!((progress_percent(&timer, later) - 25.0).abs() < 1e-9);

        let done = now + Duration::hours(5);
        assert_eq!(remaining_seconds(&timer, done), 0);
        assert!((progress_percent(&timer, done) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn huge_duration_does_not_overflow() {
        let f = fixture();
        let timer = f.store.start(1e12, "humanoid").unwrap();
        let now = f.clock.now();
        assert_eq!(remaining_seconds(&timer, now), u64::MAX);
        assert!(progress_percent(&timer, now).abs() < f64::EPSILON);
        assert_eq!(f.store.query()[0].status, TimerStatus::Active);
        assert!(!format_time_remaining(u64::MAX).is_empty());
    }

    #[test]
    fn id_not_reused_by_a_second_store() {
        let f = fixture();
        let first = f.store.start(4.0, "humanoid").unwrap();
        f.store.complete(&first.id);

        // Same backend and instant, fresh id sequence.
        let other = TimerStore::new(
            f.persistence.clone(),
            f.clock.clone(),
            Rc::new(IdGenerator::new()),
        );
        let second = other.start(4.0, "humanoid").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn format_hh_mm_ss() {
        assert_eq!(format_time_remaining(0), "00:00:00");
        assert_eq!(format_time_remaining(3661), "01:01:01");
        assert_eq!(format_time_remaining(24 * 3600 + 59), "24:00:59");
    }
}
