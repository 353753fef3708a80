//! In-process API for the presentation layer.
//!
//! `BoosterService` wires the timer store, the card collection, the catalog
//! and the reward engine together. Every method is a plain command or query
//! returning data; rendering is left to the caller.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::catalog::Catalog;
use crate::collection::CardCollectionStore;
use crate::console;
use crate::error::BoosterError;
use crate::ids::IdGenerator;
use crate::model::{Card, Timer, TimerStatus};
use crate::reward::{self, Stamp};
use crate::storage::Persistence;
use crate::time::{elapsed_hours, Clock};
use crate::timer::TimerStore;

pub struct BoosterService<R: Rng> {
    timers: TimerStore,
    collection: CardCollectionStore,
    catalog: Catalog,
    clock: Rc<dyn Clock>,
    ids: Rc<IdGenerator>,
    rng: R,
}

impl<R: Rng> BoosterService<R> {
    pub fn new(persistence: Persistence, clock: Rc<dyn Clock>, catalog: Catalog, rng: R) -> Self {
        let ids = Rc::new(IdGenerator::new());
        Self {
            timers: TimerStore::new(persistence.clone(), clock.clone(), ids.clone()),
            collection: CardCollectionStore::new(persistence, clock.clone(), ids.clone()),
            catalog,
            clock,
            ids,
            rng,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Start a wait for `booster_type`. The type must have a registered pack,
    /// so every stored timer can later be opened.
    pub fn start_timer(&self, hours: f64, booster_type: &str) -> Result<Timer, BoosterError> {
        self.catalog.lookup(booster_type)?;
        self.timers.start(hours, booster_type)
    }

    /// Zero or one timer, status freshly computed.
    pub fn query_timers(&self) -> Vec<Timer> {
        self.timers.query()
    }

    /// Poll entry point for whatever drives the UI (frame loop, interval, test).
    pub fn tick(&self) -> Vec<Timer> {
        self.query_timers()
    }

    pub fn complete_timer(&self, id: &str) -> bool {
        self.timers.complete(id)
    }

    /// Bonus `open_now` would use right now, on the 0–100 scale.
    pub fn early_open_bonus(&self, timer: &Timer) -> f64 {
        let elapsed = elapsed_hours(timer.start_time, self.clock.now());
        reward::prorated_bonus(timer.original_hours, elapsed)
    }

    /// Open a timer early: prorated bonus, generate, store, complete.
    /// The timer must still be stored; nothing changes if generation fails.
    pub fn open_now(&mut self, timer: &Timer) -> Result<Card, BoosterError> {
        let stored = self
            .timers
            .find(&timer.id)
            .ok_or_else(|| BoosterError::TimerNotFound(timer.id.clone()))?;
        let bonus = self.early_open_bonus(&stored);
        console::log(&format!(
            "[service] open now {} ({}) with {:.2}% bonus",
            stored.id, stored.booster_type, bonus
        ));
        self.collect(&stored, bonus)
    }

    /// Open a ready timer using the wait-time bonus.
    pub fn open_pack(&mut self, id: &str) -> Result<Card, BoosterError> {
        let stored = self
            .timers
            .find(id)
            .ok_or_else(|| BoosterError::TimerNotFound(id.to_string()))?;
        if stored.status != TimerStatus::Ready {
            return Err(BoosterError::TimerNotReady(stored.id));
        }
        let elapsed = elapsed_hours(stored.start_time, self.clock.now());
        let bonus = reward::calculate_bonus(elapsed);
        console::log(&format!(
            "[service] open {} ({}) with {}% bonus",
            stored.id, stored.booster_type, bonus
        ));
        self.collect(&stored, bonus as f64)
    }

    fn collect(&mut self, timer: &Timer, bonus: f64) -> Result<Card, BoosterError> {
        let card = self.generate_card(bonus, &timer.booster_type)?;
        let card = self.collection.add(card);
        self.timers.force_complete(&timer.id);
        Ok(card)
    }

    pub fn add_card(&self, card: Card) -> Card {
        self.collection.add(card)
    }

    pub fn get_all_cards(&self) -> Vec<Card> {
        self.collection.get_all()
    }

    pub fn clear_collection(&self) -> bool {
        self.collection.clear()
    }

    /// Roll a card from the named booster pack. Does not store it.
    pub fn generate_card(
        &mut self,
        bonus_percentage: f64,
        booster_type: &str,
    ) -> Result<Card, BoosterError> {
        let entry = self.catalog.lookup(booster_type).map_err(|e| {
            console::warn(&format!("[service] generate_card failed: {e}"));
            e
        })?;
        let now = self.clock.now();
        let stamp = Stamp {
            id: self.ids.next_id(now),
            created_at: now,
        };
        reward::generate_card(bonus_percentage, &entry.card_templates, &mut self.rng, stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BoosterType, PackEntry};
    use crate::model::RarityTier;
    use crate::storage::MemoryStorage;
    use crate::time::ManualClock;
    use chrono::TimeZone;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn service_with(catalog: Catalog, seed: u64) -> (Rc<ManualClock>, BoosterService<SmallRng>) {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));
        let service = BoosterService::new(
            Persistence::new(Rc::new(MemoryStorage::new())),
            clock.clone(),
            catalog,
            SmallRng::seed_from_u64(seed),
        );
        (clock, service)
    }

    fn service() -> (Rc<ManualClock>, BoosterService<SmallRng>) {
        service_with(Catalog::builtin(), 11)
    }

    #[test]
    fn start_rejects_unknown_booster_type() {
        let (_clock, svc) = service();
        assert_eq!(
            svc.start_timer(4.0, "dragon").unwrap_err(),
            BoosterError::UnknownBoosterType("dragon".into())
        );
        assert!(svc.query_timers().is_empty());
        assert!(svc.start_timer(4.0, "humanoid").is_ok());
    }

    #[test]
    fn start_rejects_unregistered_booster_type() {
        let mut catalog = Catalog::new();
        catalog.register(
            BoosterType::Humanoid,
            Catalog::builtin().get(BoosterType::Humanoid).unwrap().clone(),
        );
        let (_clock, svc) = service_with(catalog, 2);
        assert_eq!(
            svc.start_timer(4.0, "weapon").unwrap_err(),
            BoosterError::UnknownBoosterType("weapon".into())
        );
        assert!(svc.query_timers().is_empty());
    }

    #[test]
    fn stored_timer_with_unknown_type_mutates_nothing_on_open() {
        let (_clock, mut svc) = service();
        // Only reachable through old or hand-edited saves.
        let timer = svc.timers.start(4.0, "dragon").unwrap();
        assert_eq!(
            svc.open_now(&timer).unwrap_err(),
            BoosterError::UnknownBoosterType("dragon".into())
        );
        assert!(svc.get_all_cards().is_empty());
        assert_eq!(svc.query_timers(), vec![timer]);
    }

    #[test]
    fn timer_ids_unique_across_instances() {
        let clock = Rc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
        ));
        let backend = Rc::new(MemoryStorage::new());
        let instance = |seed| {
            BoosterService::new(
                Persistence::new(backend.clone()),
                clock.clone(),
                Catalog::builtin(),
                SmallRng::seed_from_u64(seed),
            )
        };

        let first = instance(1).start_timer(4.0, "humanoid").unwrap();
        assert!(instance(2).complete_timer(&first.id));
        let second = instance(3).start_timer(4.0, "humanoid").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn empty_pack_is_invalid_catalog() {
        let mut catalog = Catalog::builtin();
        let labels = catalog.get(BoosterType::Humanoid).unwrap().attribute_labels;
        catalog.register(
            BoosterType::Weapon,
            PackEntry {
                attribute_labels: labels,
                card_templates: Vec::new(),
            },
        );
        let (_clock, mut svc) = service_with(catalog, 1);
        assert_eq!(
            svc.generate_card(50.0, "weapon").unwrap_err(),
            BoosterError::InvalidCatalog
        );
        let timer = svc.start_timer(4.0, "weapon").unwrap();
        assert!(svc.open_now(&timer).is_err());
        assert_eq!(svc.query_timers().len(), 1);
    }

    #[test]
    fn generate_card_does_not_store() {
        let (_clock, mut svc) = service();
        let card = svc.generate_card(20.0, "humanoid").unwrap();
        assert!(!card.id.is_empty());
        assert!(svc.get_all_cards().is_empty());
    }

    #[test]
    fn open_now_immediately_is_base_tier() {
        for seed in 0..50 {
            let (_clock, mut svc) = service_with(Catalog::builtin(), seed);
            let timer = svc.start_timer(4.0, "humanoid").unwrap();
            assert!(svc.early_open_bonus(&timer).abs() < f64::EPSILON);
            let card = svc.open_now(&timer).unwrap();
            assert_eq!(card.rarity_tier, RarityTier::Base);
            assert!(card.bonus_percentage <= 4);
        }
    }

    #[test]
    fn open_now_after_full_duration_uses_full_bonus() {
        let (clock, mut svc) = service();
        let timer = svc.start_timer(4.0, "weapon").unwrap();
        clock.advance_hours(4.0);
        assert!((svc.early_open_bonus(&timer) - 100.0).abs() < f64::EPSILON);
        let card = svc.open_now(&timer).unwrap();
        assert_eq!(svc.get_all_cards(), vec![card]);
        assert!(svc.query_timers().is_empty());
    }

    #[test]
    fn open_now_twice_fails_second_time() {
        let (_clock, mut svc) = service();
        let timer = svc.start_timer(4.0, "humanoid").unwrap();
        svc.open_now(&timer).unwrap();
        assert_eq!(
            svc.open_now(&timer).unwrap_err(),
            BoosterError::TimerNotFound(timer.id.clone())
        );
        assert_eq!(svc.get_all_cards().len(), 1);
    }

    #[test]
    fn open_pack_requires_ready() {
        let (clock, mut svc) = service();
        let timer = svc.start_timer(6.0, "humanoid").unwrap();
        assert_eq!(
            svc.open_pack(&timer.id).unwrap_err(),
            BoosterError::TimerNotReady(timer.id.clone())
        );
        clock.advance_hours(6.0);
        let card = svc.open_pack(&timer.id).unwrap();
        assert_eq!(svc.get_all_cards()[0].id, card.id);
        assert!(svc.query_timers().is_empty());
        assert!(matches!(
            svc.open_pack(&timer.id),
            Err(BoosterError::TimerNotFound(_))
        ));
    }

    #[test]
    fn open_pack_at_four_hours_never_reaches_top() {
        // Wait bonus at 4h is 1: top and mid thresholds are both below roll 1.
        for seed in 0..50 {
            let (clock, mut svc) = service_with(Catalog::builtin(), seed);
            let timer = svc.start_timer(4.0, "humanoid").unwrap();
            clock.advance_hours(4.0);
            let card = svc.open_pack(&timer.id).unwrap();
            assert_eq!(card.rarity_tier, RarityTier::Base);
        }
    }

    #[test]
    fn tick_matches_query() {
        let (clock, svc) = service();
        svc.start_timer(1.0, "humanoid").unwrap();
        clock.advance_hours(1.0);
        assert_eq!(svc.tick()[0].status, TimerStatus::Ready);
        assert_eq!(svc.tick(), svc.query_timers());
    }
}
