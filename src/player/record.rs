//! Persistent per-player state

use crate::config::{AgeCatalog, AgeDefinition, EconomyRules};
use crate::error::{Result, WarfareError};
use serde::{Deserialize, Serialize};

/// Battlefield spawn point every new player starts at
pub const SPAWN_POSITION: Position = Position { x: 7.5, y: 9.0 };

/// Player position on the battlefield grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    #[serde(rename = "player_x")]
    pub x: f64,
    #[serde(rename = "player_y")]
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        SPAWN_POSITION
    }
}

/// Progress record for one player identity
///
/// Serialised as a flat JSON object; fields absent from an older stored
/// record take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
    /// Empty until the player picks a name
    pub name: String,
    /// Index into the age catalog
    pub age: u32,
    pub money: u64,
    pub scrolls: u64,
    pub experience: u64,
    pub level: u64,
    pub wins: u64,
    pub losses: u64,
    pub donation_progress: u64,
    pub soldiers: u64,
    /// Unix seconds of the last income collection
    pub last_soldier_income: i64,
    /// Empty or one of the current age's countries
    pub country: String,
    /// Empty or one of the current age's armor pieces
    pub armor: String,
    #[serde(flatten)]
    pub position: Position,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self::new(EconomyRules::default().starting_money)
    }
}

impl PlayerRecord {
    /// Fresh record with the given starting gold
    pub fn new(starting_money: u64) -> Self {
        Self {
            name: String::new(),
            age: 0,
            money: starting_money,
            scrolls: 0,
            experience: 0,
            level: 1,
            wins: 0,
            losses: 0,
            donation_progress: 0,
            soldiers: 0,
            last_soldier_income: 0,
            country: String::new(),
            armor: String::new(),
            position: SPAWN_POSITION,
        }
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        !self.name.is_empty()
    }

    #[inline]
    pub fn has_country(&self) -> bool {
        !self.country.is_empty()
    }

    #[inline]
    pub fn has_armor(&self) -> bool {
        !self.armor.is_empty()
    }

    /// Experience needed to leave the current level
    #[inline]
    pub fn experience_to_level(&self, exp_per_level: u64) -> u64 {
        self.level.saturating_mul(exp_per_level)
    }

    /// Catalog entry of the player's current age
    pub fn current_age<'a>(&self, catalog: &'a AgeCatalog) -> Result<&'a AgeDefinition> {
        catalog.definition(self.age)
    }

    /// Check the record against the catalog bounds
    pub fn validate(&self, catalog: &AgeCatalog) -> Result<()> {
        if self.age > catalog.max_index() {
            return Err(WarfareError::CorruptRecord(format!(
                "age {} outside 0..={}",
                self.age,
                catalog.max_index()
            )));
        }
        if self.level < 1 {
            return Err(WarfareError::CorruptRecord("level must be at least 1".to_string()));
        }

        let age = self.current_age(catalog)?;
        if self.has_country() && !age.has_country(&self.country) {
            return Err(WarfareError::CorruptRecord(format!(
                "country {:?} not available in {}",
                self.country, age.name
            )));
        }
        if self.has_armor() && !age.has_armor(&self.armor) {
            return Err(WarfareError::CorruptRecord(format!(
                "armor {:?} not available in {}",
                self.armor, age.name
            )));
        }
        if !self.position.x.is_finite() || !self.position.y.is_finite() {
            return Err(WarfareError::CorruptRecord("non-finite position".to_string()));
        }

        Ok(())
    }

    /// Serialise for the persistence gateway
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored record
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
