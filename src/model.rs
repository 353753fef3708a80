//! Persisted data shapes: timers, cards and the state blob that holds them.
//!
//! Field names follow the JSON schema stored in localStorage (`camelCase`),
//! so older saves written by the JavaScript build keep loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BOOSTER_KEY;

/// The three card attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Str,
    Dex,
    Int,
}

impl StatKind {
    /// All stats in display order.
    pub fn all() -> &'static [StatKind] {
        &[StatKind::Str, StatKind::Dex, StatKind::Int]
    }

    pub fn key(&self) -> &'static str {
        match self {
            StatKind::Str => "str",
            StatKind::Dex => "dex",
            StatKind::Int => "int",
        }
    }
}

/// A `{str, dex, int}` triple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(rename = "str", default)]
    pub strength: u32,
    #[serde(rename = "dex", default)]
    pub dexterity: u32,
    #[serde(rename = "int", default)]
    pub intelligence: u32,
}

impl Stats {
    pub const fn new(strength: u32, dexterity: u32, intelligence: u32) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
        }
    }

    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::Str => self.strength,
            StatKind::Dex => self.dexterity,
            StatKind::Int => self.intelligence,
        }
    }

    pub fn get_mut(&mut self, stat: StatKind) -> &mut u32 {
        match stat {
            StatKind::Str => &mut self.strength,
            StatKind::Dex => &mut self.dexterity,
            StatKind::Int => &mut self.intelligence,
        }
    }

    /// Sum of all three stats, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.strength
            .saturating_add(self.dexterity)
            .saturating_add(self.intelligence)
    }
}

/// Outcome band of the rarity roll.
///
/// Older saves used colour names; they are accepted on read and rewritten
/// with the current names on the next save.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityTier {
    #[serde(alias = "gold")]
    Top,
    #[serde(alias = "silver", alias = "blue")]
    Mid,
    #[serde(alias = "bronze", alias = "grey")]
    Base,
}

impl RarityTier {
    /// Sort rank, higher is rarer.
    pub fn rank(&self) -> u8 {
        match self {
            RarityTier::Top => 3,
            RarityTier::Mid => 2,
            RarityTier::Base => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RarityTier::Top => "GOLD",
            RarityTier::Mid => "SILVER",
            RarityTier::Base => "BRONZE",
        }
    }
}

/// A generated collectible. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Empty until the card is stamped by the engine or the collection.
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Template type key (`dwarf`, `sword`, ...).
    #[serde(rename = "type")]
    pub template_ref: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub flavor_text: String,
    #[serde(rename = "rarity")]
    pub rarity_tier: RarityTier,
    pub stats: Stats,
    /// Stat bonus actually applied to the primary stat.
    #[serde(default)]
    pub bonus_percentage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Stored timer status. "Completed" is represented by the timer being gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Active,
    Ready,
}

fn default_booster_type() -> String {
    DEFAULT_BOOSTER_KEY.to_string()
}

/// The single in-flight wait period.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: String,
    pub start_time: DateTime<Utc>,
    #[serde(rename = "targetDelay")]
    pub target_delay_hours: f64,
    pub original_hours: f64,
    pub status: TimerStatus,
    #[serde(default = "default_booster_type")]
    pub booster_type: String,
}

impl Timer {
    /// When the wait is over. `None` if that lies beyond chrono's range.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let ms = (self.target_delay_hours * crate::time::MS_PER_HOUR) as i64;
        self.start_time
            .checked_add_signed(chrono::Duration::try_milliseconds(ms)?)
    }
}

/// The whole blob under the storage key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
    /// Pre-single-timer saves kept a list here. Read only; migrated into
    /// `timer` on load and never written back.
    #[serde(default, skip_serializing)]
    pub active_timers: Vec<Timer>,
    /// High-water mark of the id sequence. Ids minted from it are never
    /// handed out twice, even by a fresh process in the same millisecond.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id_seq: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl PersistedState {
    /// Fold the legacy `activeTimers` list into `timer`. Returns true if the
    /// state changed and should be re-saved.
    pub fn migrate_legacy(&mut self) -> bool {
        if self.active_timers.is_empty() {
            return false;
        }
        let legacy = std::mem::take(&mut self.active_timers);
        if self.timer.is_none() {
            self.timer = legacy.into_iter().next();
        }
        true
    }
}
