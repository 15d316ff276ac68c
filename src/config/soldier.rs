//! Soldier profiles keyed by country

use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde::Serialize;

/// Strength and flaw of a country's soldiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoldierProfile {
    pub advantage: &'static str,
    pub weakness: &'static str,
}

impl SoldierProfile {
    /// Returned for countries that have no profile
    pub const NONE: SoldierProfile = SoldierProfile {
        advantage: "None",
        weakness: "None",
    };
}

/// Read-only country -> profile map
#[derive(Debug)]
pub struct SoldierProfileTable {
    profiles: AHashMap<&'static str, SoldierProfile>,
}

const PROFILES: [(&str, &str, &str); 24] = [
    ("Cave Dwellers", "Stealth", "Low Defense"),
    ("Nomadic Tribes", "Mobility", "Weak Offense"),
    ("Settlers", "Defense", "Slow"),
    ("Bronze Kingdoms", "Armor", "Less Agile"),
    ("Classical Rome", "Tactics", "Vulnerable to Range"),
    ("Han Dynasty", "Archery Skills", "Close Combat"),
    ("Sparta", "Strength", "Stamina Issues"),
    ("Celtic Tribes", "Bravery", "Unorganized"),
    ("Germanic Clans", "Ferocity", "Discipline"),
    ("Vikings", "Nautical Skills", "Land Battles"),
    ("England", "Archery", "Cavalry Weak"),
    ("Holy Roman Empire", "Armor Training", "Heavy Equipment"),
    ("Spain", "Cavalry", "Bad Supply Lines"),
    ("French Empire", "Artillery", "Mobility"),
    ("Ottoman Empire", "Infantry", "Slow to Reload"),
    ("British Empire", "Firepower", "Limited Resources"),
    ("German Reich", "Technology", "Resource Intensive"),
    ("Russian Empire", "Endurance", "Logistics"),
    ("United States", "Firearms", "Overconfident"),
    ("Soviet Union", "Tank Warfare", "Fuel Dependence"),
    ("NATO Alliance", "Coalition Forces", "Conflicting Tactics"),
    ("Galactic Federation", "Advanced Tech", "Unfamiliar Terrain"),
    ("Cyber Collective", "Cyber Defense", "Physical Combat"),
    ("Space Colonies", "Adaptability", "Limited Resources"),
];

/// Global soldier profile table
pub static SOLDIER_PROFILES: Lazy<SoldierProfileTable> = Lazy::new(|| {
    let mut profiles = AHashMap::with_capacity(PROFILES.len());
    for (country, advantage, weakness) in PROFILES {
        profiles.insert(country, SoldierProfile { advantage, weakness });
    }
    SoldierProfileTable { profiles }
});

impl SoldierProfileTable {
    pub fn standard() -> &'static SoldierProfileTable {
        &SOLDIER_PROFILES
    }

    /// Profile for a country, or the `"None"` sentinel. Never fails.
    pub fn profile(&self, country: &str) -> SoldierProfile {
        self.profiles
            .get(country)
            .copied()
            .unwrap_or(SoldierProfile::NONE)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
