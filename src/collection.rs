//! Card collection: append-only, reset wholesale.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::catalog::{BoosterType, Catalog};
use crate::console;
use crate::ids::IdGenerator;
use crate::model::{Card, RarityTier};
use crate::storage::Persistence;
use crate::time::Clock;

pub struct CardCollectionStore {
    persistence: Persistence,
    clock: Rc<dyn Clock>,
    ids: Rc<IdGenerator>,
}

impl CardCollectionStore {
    pub fn new(persistence: Persistence, clock: Rc<dyn Clock>, ids: Rc<IdGenerator>) -> Self {
        Self {
            persistence,
            clock,
            ids,
        }
    }

    /// Append a card, stamping id and timestamp if missing. Returns what was stored.
    pub fn add(&self, mut card: Card) -> Card {
        let mut state = self.persistence.load();
        let now = self.clock.now();
        if card.id.is_empty() || state.cards.iter().any(|c| c.id == card.id) {
            card.id = self.ids.next_tracked(now, &mut state.id_seq);
        }
        if card.created_at.is_none() {
            card.created_at = Some(now);
        }
        state.cards.push(card.clone());
        self.persistence.save(&state);
        card
    }

    /// All cards in insertion order.
    pub fn get_all(&self) -> Vec<Card> {
        self.persistence.load().cards
    }

    pub fn clear(&self) -> bool {
        let mut state = self.persistence.load();
        state.cards.clear();
        self.persistence.save(&state);
        console::log("[collection] card collection emptied");
        true
    }
}

/// Card counts per tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub total: usize,
    pub top: usize,
    pub mid: usize,
    pub base: usize,
}

impl CollectionSummary {
    pub fn of(cards: &[Card]) -> Self {
        let mut summary = Self {
            total: cards.len(),
            ..Self::default()
        };
        for card in cards {
            match card.rarity_tier {
                RarityTier::Top => summary.top += 1,
                RarityTier::Mid => summary.mid += 1,
                RarityTier::Base => summary.base += 1,
            }
        }
        summary
    }
}

/// Cards of one booster type, display-ordered.
#[derive(Clone, Debug, PartialEq)]
pub struct CardGroup {
    pub booster: BoosterType,
    pub cards: Vec<Card>,
}

/// Group cards by booster type (catalog order), then sort each group by
/// template order, rarity (rarest first), and stat total (highest first).
/// Cards whose type is not in the catalog are left out.
pub fn group_for_display(cards: &[Card], catalog: &Catalog) -> Vec<CardGroup> {
    BoosterType::all()
        .iter()
        .map(|&booster| {
            let mut group: Vec<Card> = cards
                .iter()
                .filter(|c| catalog.booster_for_card_type(&c.template_ref) == Some(booster))
                .cloned()
                .collect();
            group.sort_by(|a, b| display_order(a, b, catalog));
            CardGroup {
                booster,
                cards: group,
            }
        })
        .collect()
}

fn display_order(a: &Card, b: &Card, catalog: &Catalog) -> Ordering {
    let type_a = catalog.template_index(&a.template_ref).unwrap_or(usize::MAX);
    let type_b = catalog.template_index(&b.template_ref).unwrap_or(usize::MAX);
    type_a
        .cmp(&type_b)
        .then_with(|| b.rarity_tier.rank().cmp(&a.rarity_tier.rank()))
        .then_with(|| b.stats.total().cmp(&a.stats.total()))
}
