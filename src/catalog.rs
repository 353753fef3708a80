//! Booster pack catalog: which card templates each booster type can produce.
//!
//! Lookups go through the closed [`BoosterType`] enumeration. A string key
//! that does not name a booster type, or a type with no registered pack,
//! is an error rather than a guess.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::BoosterError;
use crate::model::{StatKind, Stats};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoosterType {
    Humanoid,
    Weapon,
}

impl BoosterType {
    /// All booster types in display order.
    pub fn all() -> &'static [BoosterType] {
        &[BoosterType::Humanoid, BoosterType::Weapon]
    }

    /// Key stored in `Timer::booster_type`.
    pub fn key(&self) -> &'static str {
        match self {
            BoosterType::Humanoid => "humanoid",
            BoosterType::Weapon => "weapon",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BoosterType::Humanoid => "Humanoid",
            BoosterType::Weapon => "Weapon",
        }
    }
}

impl FromStr for BoosterType {
    type Err = BoosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoosterType::all()
            .iter()
            .copied()
            .find(|t| t.key() == s)
            .ok_or_else(|| BoosterError::UnknownBoosterType(s.to_string()))
    }
}

/// Static definition of one collectible.
#[derive(Clone, Debug, PartialEq)]
pub struct CardTemplate {
    pub name: &'static str,
    pub type_key: &'static str,
    pub description: &'static str,
    pub primary_stat: StatKind,
    pub base_stats: Stats,
    pub flavor_text: &'static str,
}

/// Display labels for the three stats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeLabels {
    pub strength: &'static str,
    pub dexterity: &'static str,
    pub intelligence: &'static str,
}

impl AttributeLabels {
    pub fn get(&self, stat: StatKind) -> &'static str {
        match stat {
            StatKind::Str => self.strength,
            StatKind::Dex => self.dexterity,
            StatKind::Int => self.intelligence,
        }
    }
}

const STANDARD_LABELS: AttributeLabels = AttributeLabels {
    strength: "Strength",
    dexterity: "Dexterity",
    intelligence: "Intelligence",
};

/// Everything a booster type contributes.
#[derive(Clone, Debug, PartialEq)]
pub struct PackEntry {
    pub attribute_labels: AttributeLabels,
    pub card_templates: Vec<CardTemplate>,
}

/// Registry of booster type → pack entry.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    packs: HashMap<BoosterType, PackEntry>,
    /// Template type key → owning booster type, rebuilt on every `register`.
    owners: HashMap<&'static str, BoosterType>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The humanoid and weapon packs.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(BoosterType::Humanoid, humanoid_pack());
        catalog.register(BoosterType::Weapon, weapon_pack());
        catalog
    }

    /// Add or replace the entry for `booster`.
    pub fn register(&mut self, booster: BoosterType, entry: PackEntry) {
        self.owners.retain(|_, owner| *owner != booster);
        for template in &entry.card_templates {
            self.owners.insert(template.type_key, booster);
        }
        self.packs.insert(booster, entry);
    }

    pub fn get(&self, booster: BoosterType) -> Result<&PackEntry, BoosterError> {
        self.packs
            .get(&booster)
            .ok_or_else(|| BoosterError::UnknownBoosterType(booster.key().to_string()))
    }

    /// Lookup by stored string key.
    pub fn lookup(&self, key: &str) -> Result<&PackEntry, BoosterError> {
        self.get(key.parse()?)
    }

    /// Booster type whose pack defines `type_key`.
    pub fn booster_for_card_type(&self, type_key: &str) -> Option<BoosterType> {
        self.owners.get(type_key).copied()
    }

    /// Template for a stored card's type key.
    pub fn template(&self, type_key: &str) -> Option<&CardTemplate> {
        let booster = self.booster_for_card_type(type_key)?;
        self.packs
            .get(&booster)?
            .card_templates
            .iter()
            .find(|t| t.type_key == type_key)
    }

    /// Position of `type_key` within its pack, used as the display order.
    pub fn template_index(&self, type_key: &str) -> Option<usize> {
        let booster = self.booster_for_card_type(type_key)?;
        self.packs
            .get(&booster)?
            .card_templates
            .iter()
            .position(|t| t.type_key == type_key)
    }
}

fn humanoid_pack() -> PackEntry {
    PackEntry {
        attribute_labels: STANDARD_LABELS,
        card_templates: vec![
            CardTemplate {
                name: "Dwarf — Heavy Arms",
                type_key: "dwarf",
                description: "A sturdy dwarf with powerful arms",
                primary_stat: StatKind::Str,
                base_stats: Stats::new(20, 5, 5),
                flavor_text: "Brawn over brains, always.",
            },
            CardTemplate {
                name: "Big Foot — Large Feet",
                type_key: "bigfoot",
                description: "A nimble creature with large, dexterous feet",
                primary_stat: StatKind::Dex,
                base_stats: Stats::new(5, 20, 5),
                flavor_text: "Light on his feet, quick as the wind.",
            },
            CardTemplate {
                name: "Elf — Large Head",
                type_key: "elf",
                description: "An intelligent elf with a large, wise head",
                primary_stat: StatKind::Int,
                base_stats: Stats::new(5, 5, 20),
                flavor_text: "Knowledge is power, and I am its vessel.",
            },
        ],
    }
}

fn weapon_pack() -> PackEntry {
    PackEntry {
        attribute_labels: STANDARD_LABELS,
        card_templates: vec![
            CardTemplate {
                name: "Shield of the Sentinel",
                type_key: "shield",
                description: "A formidable shield pulsing with arcane energy.",
                primary_stat: StatKind::Int,
                base_stats: Stats::new(0, 0, 20),
                flavor_text: "The best offense is an unbreakable defense.",
            },
            CardTemplate {
                name: "Blade of the Swift",
                type_key: "sword",
                description: "A razor-sharp sword, light and deadly.",
                primary_stat: StatKind::Dex,
                base_stats: Stats::new(0, 20, 0),
                flavor_text: "A blur of steel, a whisper of death.",
            },
            CardTemplate {
                name: "Hammer of the Titan",
                type_key: "hammer",
                description: "A massive hammer that crushes foes with raw power.",
                primary_stat: StatKind::Str,
                base_stats: Stats::new(20, 0, 0),
                flavor_text: "Might makes right.",
            },
        ],
    }
}
