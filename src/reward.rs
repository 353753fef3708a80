//! Reward engine. Pure functions over a caller-supplied RNG.
//!
//! Two bonus scales feed the same tier ladder:
//! - [`calculate_bonus`]: 1–20, from how long a timer ran (natural opening).
//! - [`prorated_bonus`]: 0–100, from how much of the timer elapsed ("open now").
//!
//! A roll in `1..=100` lands in the top tier when `roll <= bonus * 0.25`, in
//! the mid tier when `roll <= bonus * 0.75`, and in the base tier otherwise.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::catalog::CardTemplate;
use crate::constants::{
    BASE_TIER_BONUS, MAX_PRORATED_BONUS, MAX_WAIT_BONUS, MAX_WAIT_HOURS, MID_TIER_BONUS,
    MID_TIER_FACTOR, MIN_WAIT_BONUS, MIN_WAIT_HOURS, ROLL_MAX, TOP_TIER_BONUS, TOP_TIER_FACTOR,
};
use crate::error::BoosterError;
use crate::model::{Card, RarityTier, StatKind, Stats};

/// Wait-time bonus. Saturates below 4h and above 24h.
pub fn calculate_bonus(elapsed_hours: f64) -> u32 {
    let hours = elapsed_hours.clamp(MIN_WAIT_HOURS, MAX_WAIT_HOURS);
    // NaN saturates to 0 in the cast and is lifted by the clamp below.
    let raw = (hours - MIN_WAIT_HOURS).floor() as i64;
    raw.clamp(MIN_WAIT_BONUS as i64, MAX_WAIT_BONUS as i64) as u32
}

/// Early-open bonus: share of the original duration that has elapsed, as 0–100.
pub fn prorated_bonus(original_hours: f64, elapsed_hours: f64) -> f64 {
    if elapsed_hours >= original_hours {
        return MAX_PRORATED_BONUS;
    }
    let bonus = elapsed_hours / original_hours * MAX_PRORATED_BONUS;
    bonus.max(0.0).min(MAX_PRORATED_BONUS)
}

/// Tier for a given roll. Boundaries are inclusive on the rarer side.
pub fn roll_tier(roll: u32, bonus_percentage: f64) -> RarityTier {
    let roll = roll as f64;
    if roll <= bonus_percentage * TOP_TIER_FACTOR {
        RarityTier::Top
    } else if roll <= bonus_percentage * MID_TIER_FACTOR {
        RarityTier::Mid
    } else {
        RarityTier::Base
    }
}

/// Inclusive stat bonus range for a tier.
pub fn tier_bonus_range(tier: RarityTier) -> (u32, u32) {
    match tier {
        RarityTier::Top => TOP_TIER_BONUS,
        RarityTier::Mid => MID_TIER_BONUS,
        RarityTier::Base => BASE_TIER_BONUS,
    }
}

/// Primary stat gets the full bonus, the others half (rounded down).
pub fn apply_bonus(template: &CardTemplate, bonus: u32) -> Stats {
    let mut stats = template.base_stats;
    for &stat in StatKind::all() {
        let add = if stat == template.primary_stat {
            bonus
        } else {
            bonus / 2
        };
        *stats.get_mut(stat) += add;
    }
    stats
}

/// Identity given to a freshly generated card.
#[derive(Clone, Debug, PartialEq)]
pub struct Stamp {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Roll one card from `templates`.
pub fn generate_card<R: Rng + ?Sized>(
    bonus_percentage: f64,
    templates: &[CardTemplate],
    rng: &mut R,
    stamp: Stamp,
) -> Result<Card, BoosterError> {
    if templates.is_empty() {
        return Err(BoosterError::InvalidCatalog);
    }
    let template = &templates[rng.gen_range(0..templates.len())];

    let roll = rng.gen_range(1..=ROLL_MAX);
    let tier = roll_tier(roll, bonus_percentage);
    let (lo, hi) = tier_bonus_range(tier);
    let bonus = rng.gen_range(lo..=hi);

    Ok(Card {
        id: stamp.id,
        name: template.name.to_string(),
        template_ref: template.type_key.to_string(),
        description: template.description.to_string(),
        flavor_text: template.flavor_text.to_string(),
        rarity_tier: tier,
        stats: apply_bonus(template, bonus),
        bonus_percentage: bonus,
        created_at: Some(stamp.created_at),
    })
}
