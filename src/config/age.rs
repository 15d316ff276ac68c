//! Age tier catalog

use crate::error::{Result, WarfareError};
use once_cell::sync::Lazy;
use serde::Serialize;

/// One tier of the age ladder
#[derive(Debug, Clone, Serialize)]
pub struct AgeDefinition {
    pub index: u32,
    pub name: &'static str,
    pub weapons: &'static [&'static str],
    pub armor: &'static [&'static str],
    pub countries: &'static [&'static str],
    /// Gold price of one scroll while in this age
    pub scroll_cost: u64,
}

impl AgeDefinition {
    pub fn has_country(&self, country: &str) -> bool {
        self.countries.contains(&country)
    }

    pub fn has_armor(&self, armor: &str) -> bool {
        self.armor.contains(&armor)
    }
}

/// Immutable table of all age tiers, ordered by index
#[derive(Debug)]
pub struct AgeCatalog {
    ages: Vec<AgeDefinition>,
}

/// The standard eight-tier ladder, built once on first use
pub static AGE_CATALOG: Lazy<AgeCatalog> = Lazy::new(|| AgeCatalog {
    ages: vec![
        AgeDefinition {
            index: 0,
            name: "Neolithic",
            weapons: &["Stone Axe", "Wooden Spear", "Sling"],
            armor: &["Leather Hide", "Fur Cloak", "Bone Shield"],
            countries: &["Cave Dwellers", "Nomadic Tribes", "Settlers"],
            scroll_cost: 50,
        },
        AgeDefinition {
            index: 1,
            name: "Bronze Age",
            weapons: &["Bronze Sword", "Bronze Spear", "Bow"],
            armor: &["Bronze Breastplate", "Bronze Helmet", "Bronze Shield"],
            countries: &["Bronze Kingdoms", "Classical Rome", "Han Dynasty"],
            scroll_cost: 100,
        },
        AgeDefinition {
            index: 2,
            name: "Iron Age",
            weapons: &["Iron Sword", "Crossbow", "Catapult"],
            armor: &["Iron Mail", "Iron Helmet", "Reinforced Shield"],
            countries: &["Sparta", "Celtic Tribes", "Germanic Clans"],
            scroll_cost: 200,
        },
        AgeDefinition {
            index: 3,
            name: "Medieval",
            weapons: &["Steel Sword", "Longbow", "Trebuchet"],
            armor: &["Chainmail", "Knight's Plate", "Tower Shield"],
            countries: &["Vikings", "England", "Holy Roman Empire"],
            scroll_cost: 400,
        },
        AgeDefinition {
            index: 4,
            name: "Renaissance",
            weapons: &["Musket", "Cannon", "Pike"],
            armor: &["Steel Cuirass", "Morion Helmet", "Pavise Shield"],
            countries: &["Spain", "French Empire", "Ottoman Empire"],
            scroll_cost: 800,
        },
        AgeDefinition {
            index: 5,
            name: "Industrial",
            weapons: &["Rifle", "Artillery", "Machine Gun"],
            armor: &["Military Uniform", "Steel Helmet", "Trench Armor"],
            countries: &["British Empire", "German Reich", "Russian Empire"],
            scroll_cost: 1600,
        },
        AgeDefinition {
            index: 6,
            name: "Modern",
            weapons: &["Assault Rifle", "Tank", "Fighter Jet"],
            armor: &["Kevlar Vest", "Combat Helmet", "Riot Shield"],
            countries: &["United States", "Soviet Union", "NATO Alliance"],
            scroll_cost: 3200,
        },
        AgeDefinition {
            index: 7,
            name: "Sci-Fi",
            weapons: &["Laser Rifle", "Mech Suit", "Plasma Cannon"],
            armor: &["Energy Shield", "Nano Armor", "Power Suit"],
            countries: &["Galactic Federation", "Cyber Collective", "Space Colonies"],
            scroll_cost: 6400,
        },
    ],
});

impl AgeCatalog {
    /// The standard catalog
    pub fn standard() -> &'static AgeCatalog {
        &AGE_CATALOG
    }

    /// Look up an age tier; only fails for an index outside the ladder
    pub fn definition(&self, index: u32) -> Result<&AgeDefinition> {
        self.ages
            .get(index as usize)
            .ok_or(WarfareError::AgeNotFound(index))
    }

    /// Highest reachable age index
    pub fn max_index(&self) -> u32 {
        self.ages.len().saturating_sub(1) as u32
    }

    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgeDefinition> {
        self.ages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eight_tiers_in_order() {
        let catalog = AgeCatalog::standard();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.max_index(), 7);
        for (position, age) in catalog.iter().enumerate() {
            assert_eq!(age.index as usize, position);
            assert_eq!(age.weapons.len(), 3);
            assert_eq!(age.armor.len(), 3);
            assert_eq!(age.countries.len(), 3);
        }
    }

    #[test]
    fn test_scroll_cost_doubles() {
        let catalog = AgeCatalog::standard();
        let costs: Vec<u64> = catalog.iter().map(|a| a.scroll_cost).collect();
        assert_eq!(costs, vec![50, 100, 200, 400, 800, 1600, 3200, 6400]);
    }

    #[test]
    fn test_out_of_range_lookup() {
        let catalog = AgeCatalog::standard();
        assert_eq!(catalog.definition(0).unwrap().name, "Neolithic");
        assert_eq!(catalog.definition(7).unwrap().name, "Sci-Fi");
        assert!(matches!(
            catalog.definition(8),
            Err(WarfareError::AgeNotFound(8))
        ));
    }

    #[test]
    fn test_membership() {
        let bronze = AgeCatalog::standard().definition(1).unwrap();
        assert!(bronze.has_country("Classical Rome"));
        assert!(!bronze.has_country("Sparta"));
        assert!(bronze.has_armor("Bronze Helmet"));
        assert!(!bronze.has_armor("Chainmail"));
    }
}
