//! Screen state for the booster frontend.
//!
//! Holds the service plus everything the render pass needs: the selected
//! booster type and duration, the latest timer/collection snapshot, the
//! available actions and a short message log.

use rand::Rng;

use shell_pack_booster::constants::{
    SLIDER_DEFAULT_HOURS, SLIDER_MAX_HOURS, SLIDER_MIN_HOURS, TICK_INTERVAL_MS,
};
use shell_pack_booster::time::PollThrottle;
use shell_pack_booster::{BoosterService, BoosterType, Card, Timer, TimerStatus};

const MAX_LOG: usize = 30;

/// An action the player can take right now.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub label: String,
    pub key: char,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

pub struct App<R: Rng> {
    pub service: BoosterService<R>,
    pub booster: BoosterType,
    pub hours: u32,
    pub timers: Vec<Timer>,
    pub cards: Vec<Card>,
    /// Most recently opened card, shown until the next pack.
    pub last_card: Option<Card>,
    /// Armed by the first "empty collection" press; any other action disarms it.
    pub confirm_clear: bool,
    pub actions: Vec<Action>,
    pub log: Vec<LogEntry>,
    throttle: PollThrottle,
}

impl<R: Rng> App<R> {
    pub fn new(service: BoosterService<R>) -> Self {
        let mut app = Self {
            service,
            booster: BoosterType::Humanoid,
            hours: SLIDER_DEFAULT_HOURS,
            timers: Vec::new(),
            cards: Vec::new(),
            last_card: None,
            confirm_clear: false,
            actions: Vec::new(),
            log: Vec::new(),
            throttle: PollThrottle::new(TICK_INTERVAL_MS),
        };
        app.refresh();
        app.add_log("ブースターを選んでタイマーを開始しよう。", false);
        app
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    /// The stored timer, if any.
    pub fn timer(&self) -> Option<&Timer> {
        self.timers.first()
    }

    /// Called every animation frame; re-reads the stores once per tick interval.
    pub fn on_frame(&mut self, now_ms: f64) {
        if self.throttle.update(now_ms) {
            self.refresh();
        }
    }

    /// Re-read timers and cards and rebuild the action list.
    pub fn refresh(&mut self) {
        let before = self.timer().map(|t| t.status);
        self.timers = self.service.tick();
        self.cards = self.service.get_all_cards();
        if before == Some(TimerStatus::Active)
            && self.timer().map(|t| t.status) == Some(TimerStatus::Ready)
        {
            self.add_log("パックの準備ができた！", true);
        }
        self.update_actions();
    }

    pub fn update_actions(&mut self) {
        self.actions.clear();
        match self.timer().map(|t| t.status) {
            None => {
                for booster in BoosterType::all() {
                    let mark = if *booster == self.booster { "●" } else { "○" };
                    self.actions.push(Action {
                        label: format!("{mark} {} ブースター", booster.display_name()),
                        key: booster_key(*booster),
                    });
                }
                self.actions.push(Action {
                    label: format!("待ち時間を減らす ({}h)", self.hours),
                    key: '-',
                });
                self.actions.push(Action {
                    label: format!("待ち時間を増やす ({}h)", self.hours),
                    key: '+',
                });
                self.actions.push(Action {
                    label: "タイマー開始".into(),
                    key: 's',
                });
            }
            Some(TimerStatus::Active) => {
                self.actions.push(Action {
                    label: "今すぐ開ける".into(),
                    key: 'n',
                });
            }
            Some(TimerStatus::Ready) => {
                self.actions.push(Action {
                    label: "パックを開ける".into(),
                    key: 'o',
                });
            }
        }
        if !self.cards.is_empty() {
            let label = if self.confirm_clear {
                "本当に空にする？もう一度押して確定"
            } else {
                "コレクションを空にする"
            };
            self.actions.push(Action {
                label: label.into(),
                key: 'x',
            });
        }
    }

    pub fn handle_action(&mut self, key: char) {
        // '=' shares a key with '+' on most layouts.
        let key = if key == '=' { '+' } else { key };
        if !self.actions.iter().any(|a| a.key == key) {
            return;
        }
        if key != 'x' {
            self.confirm_clear = false;
        }

        match key {
            'h' => self.booster = BoosterType::Humanoid,
            'w' => self.booster = BoosterType::Weapon,
            '-' => self.hours = self.hours.saturating_sub(1).max(SLIDER_MIN_HOURS),
            '+' => self.hours = (self.hours + 1).min(SLIDER_MAX_HOURS),
            's' => self.start(),
            'n' => self.open_now(),
            'o' => self.open_pack(),
            'x' => self.clear(),
            _ => {}
        }

        self.refresh();
    }

    fn start(&mut self) {
        match self.service.start_timer(self.hours as f64, self.booster.key()) {
            Ok(timer) => self.add_log(
                &format!(
                    "{} ブースターのタイマーを開始 ({}h)",
                    self.booster.display_name(),
                    timer.original_hours
                ),
                false,
            ),
            Err(e) => self.add_log(&format!("開始できない: {e}"), true),
        }
    }

    fn open_now(&mut self) {
        let Some(timer) = self.timer().cloned() else {
            return;
        };
        let result = self.service.open_now(&timer);
        self.receive(result);
    }

    fn open_pack(&mut self) {
        let Some(id) = self.timer().map(|t| t.id.clone()) else {
            return;
        };
        let result = self.service.open_pack(&id);
        self.receive(result);
    }

    fn receive(&mut self, result: Result<Card, shell_pack_booster::BoosterError>) {
        match result {
            Ok(card) => {
                self.add_log(
                    &format!(
                        "{} [{}] を手に入れた！ (+{}%)",
                        card.name,
                        card.rarity_tier.label(),
                        card.bonus_percentage
                    ),
                    true,
                );
                self.last_card = Some(card);
            }
            Err(e) => self.add_log(&format!("パックを開けられない: {e}"), true),
        }
    }

    fn clear(&mut self) {
        if !self.confirm_clear {
            self.confirm_clear = true;
            return;
        }
        self.confirm_clear = false;
        self.service.clear_collection();
        self.last_card = None;
        self.add_log("コレクションを空にした。", false);
    }
}

fn booster_key(booster: BoosterType) -> char {
    match booster {
        BoosterType::Humanoid => 'h',
        BoosterType::Weapon => 'w',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use shell_pack_booster::{Catalog, ManualClock, MemoryStorage, Persistence};
    use std::rc::Rc;

    fn app() -> (Rc<ManualClock>, App<SmallRng>) {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 8, 1, 8, 0, 0).unwrap(),
        ));
        let service = BoosterService::new(
            Persistence::new(Rc::new(MemoryStorage::new())),
            clock.clone(),
            Catalog::builtin(),
            SmallRng::seed_from_u64(3),
        );
        (clock, App::new(service))
    }

    fn keys(app: &App<SmallRng>) -> Vec<char> {
        app.actions.iter().map(|a| a.key).collect()
    }

    #[test]
    fn idle_actions() {
        let (_clock, app) = app();
        assert_eq!(keys(&app), vec!['h', 'w', '-', '+', 's']);
        assert_eq!(app.hours, 4);
    }

    #[test]
    fn hours_stay_in_slider_range() {
        let (_clock, mut app) = app();
        app.handle_action('-');
        assert_eq!(app.hours, 4);
        for _ in 0..30 {
            app.handle_action('+');
        }
        assert_eq!(app.hours, 24);
        app.handle_action('-');
        app.handle_action('=');
        assert_eq!(app.hours, 24);
    }

    #[test]
    fn start_uses_selected_booster_and_hours() {
        let (_clock, mut app) = app();
        app.handle_action('w');
        app.handle_action('+');
        app.handle_action('s');
        let timer = app.timer().unwrap();
        assert_eq!(timer.booster_type, "weapon");
        assert!((timer.original_hours - 5.0).abs() < f64::EPSILON);
        assert_eq!(keys(&app), vec!['n']);
    }

    #[test]
    fn keys_not_on_screen_are_ignored() {
        let (_clock, mut app) = app();
        app.handle_action('o');
        app.handle_action('n');
        assert!(app.timer().is_none());
        assert!(app.cards.is_empty());
    }

    #[test]
    fn frame_polling_flips_to_ready() {
        let (clock, mut app) = app();
        app.handle_action('s');
        app.on_frame(0.0);
        clock.advance_hours(4.0);
        app.on_frame(500.0);
        assert_eq!(app.timer().unwrap().status, TimerStatus::Active);
        app.on_frame(1000.0);
        assert_eq!(app.timer().unwrap().status, TimerStatus::Ready);
        assert_eq!(keys(&app), vec!['o']);
        assert!(app.log.last().unwrap().is_important);
    }

    #[test]
    fn open_pack_adds_card_and_resets() {
        let (clock, mut app) = app();
        app.handle_action('s');
        clock.advance_hours(4.0);
        app.refresh();
        app.handle_action('o');
        assert!(app.timer().is_none());
        assert_eq!(app.cards.len(), 1);
        assert_eq!(app.last_card.as_ref(), app.cards.first());
        assert_eq!(keys(&app), vec!['h', 'w', '-', '+', 's', 'x']);
    }

    #[test]
    fn open_now_while_active() {
        let (clock, mut app) = app();
        app.handle_action('s');
        clock.advance_hours(1.0);
        app.handle_action('n');
        assert!(app.timer().is_none());
        assert_eq!(app.cards.len(), 1);
    }

    #[test]
    fn clear_needs_two_presses() {
        let (_clock, mut app) = app();
        app.handle_action('s');
        app.handle_action('n');
        assert_eq!(app.cards.len(), 1);

        app.handle_action('x');
        assert!(app.confirm_clear);
        assert_eq!(app.cards.len(), 1);

        app.handle_action('x');
        assert!(!app.confirm_clear);
        assert!(app.cards.is_empty());
        assert!(app.last_card.is_none());
    }

    #[test]
    fn other_action_disarms_clear() {
        let (_clock, mut app) = app();
        app.handle_action('s');
        app.handle_action('n');
        app.handle_action('x');
        app.handle_action('w');
        assert!(!app.confirm_clear);
        app.handle_action('x');
        assert_eq!(app.cards.len(), 1);
    }

    #[test]
    fn log_is_bounded() {
        let (_clock, mut app) = app();
        for i in 0..100 {
            app.add_log(&format!("line {i}"), false);
        }
        assert_eq!(app.log.len(), MAX_LOG);
        assert_eq!(app.log.last().unwrap().text, "line 99");
    }
}
