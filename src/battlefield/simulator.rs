//! Real-time battlefield encounters: layout generation, movement, settlement

use crate::config::BattlefieldRules;
use crate::error::{Result, WarfareError};
use crate::player::{PlayerRecord, Position};
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Side a map marker belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Soldier,
    Enemy,
}

/// One unit on the battlefield grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    pub alive: bool,
}

impl Marker {
    fn new(x: i32, y: i32, kind: MarkerKind) -> Self {
        Self {
            x,
            y,
            kind,
            alive: true,
        }
    }
}

/// Generated encounter layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattlefieldMap {
    pub width: i32,
    pub height: i32,
    pub soldiers: Vec<Marker>,
    pub enemies: Vec<Marker>,
}

/// Everything the client needs to run an encounter
#[derive(Debug, Clone, PartialEq)]
pub struct Encounter {
    pub soldiers: u64,
    pub map: BattlefieldMap,
    pub position: Position,
}

/// Outcome counters reported by the client when an encounter ends
///
/// These values are taken as-is; nothing here is checked against the
/// generated layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BattlefieldReport {
    pub enemies_killed: u64,
    pub time_survived: u64,
    pub gold_earned: u64,
    pub retreated: bool,
}

/// What ending an encounter did to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattlefieldSettlement {
    pub report: BattlefieldReport,
    pub experience_gained: u64,
    pub levels_gained: u64,
    pub soldiers_lost: u64,
}

impl fmt::Display for BattlefieldSettlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.report;
        let opening = if report.retreated {
            "Retreated safely!"
        } else {
            "All soldiers perished!"
        };
        write!(
            f,
            "{} Earned {} gold, {} XP. Killed {} enemies in {}s.",
            opening,
            report.gold_earned,
            self.experience_gained,
            report.enemies_killed,
            report.time_survived
        )
    }
}

/// Runs battlefield encounters for a player record
#[derive(Debug, Clone, Copy)]
pub struct BattlefieldSimulator<'a> {
    rules: &'a BattlefieldRules,
    exp_per_level: u64,
}

impl<'a> BattlefieldSimulator<'a> {
    pub fn new(rules: &'a BattlefieldRules, exp_per_level: u64) -> Self {
        Self {
            rules,
            exp_per_level,
        }
    }

    /// Open an encounter; requires at least one soldier
    pub fn start<R: Rng + ?Sized>(&self, record: &PlayerRecord, rng: &mut R) -> Result<Encounter> {
        if record.soldiers == 0 {
            return Err(WarfareError::NoSoldiers);
        }

        Ok(Encounter {
            soldiers: record.soldiers,
            map: self.generate_map(record.soldiers, rng),
            position: record.position,
        })
    }

    /// Lay out friendly markers around the spawn and enemies over the grid
    pub fn generate_map<R: Rng + ?Sized>(&self, soldier_count: u64, rng: &mut R) -> BattlefieldMap {
        let rules = self.rules;

        let shown = soldier_count.min(rules.max_soldier_markers) as usize;
        let mut soldiers = Vec::with_capacity(shown);
        for _ in 0..shown {
            let x = rng.gen_range(rules.soldier_x_min..=rules.soldier_x_max);
            let y = rng.gen_range(rules.soldier_y_min..=rules.soldier_y_max);
            soldiers.push(Marker::new(x, y, MarkerKind::Soldier));
        }

        let enemy_count = rng.gen_range(rules.enemy_count_min..=rules.enemy_count_max);
        let mut enemies = Vec::with_capacity(enemy_count);
        for _ in 0..enemy_count {
            let x = rng.gen_range(0..rules.width);
            let y = rng.gen_range(0..rules.height);
            if !self.is_near_spawn(x, y) {
                enemies.push(Marker::new(x, y, MarkerKind::Enemy));
            }
        }

        BattlefieldMap {
            width: rules.width,
            height: rules.height,
            soldiers,
            enemies,
        }
    }

    /// Spawn exclusion test: only cells inside the clearance on BOTH axes
    /// are excluded.
    #[inline]
    pub fn is_near_spawn(&self, x: i32, y: i32) -> bool {
        let rules = self.rules;
        (f64::from(x) - rules.spawn_x).abs() <= rules.spawn_clearance
            && (f64::from(y) - rules.spawn_y).abs() <= rules.spawn_clearance
    }

    /// Overwrite the player position; off-grid positions are accepted
    pub fn move_to(&self, record: &mut PlayerRecord, position: Position) {
        record.position = position;
    }

    /// Apply client-reported results
    ///
    /// Unlike a resolved battle, experience overflow carries over and several
    /// levels can be gained at once. Without a retreat every soldier is lost.
    pub fn end(&self, record: &mut PlayerRecord, report: BattlefieldReport) -> BattlefieldSettlement {
        let rules = self.rules;

        // client-reported counters are unbounded
        record.money = record.money.saturating_add(report.gold_earned);

        let experience_gained = report
            .enemies_killed
            .saturating_mul(rules.exp_per_kill)
            .saturating_add(report.time_survived / rules.seconds_per_exp);
        record.experience = record.experience.saturating_add(experience_gained);

        let mut levels_gained = 0;
        while record.experience >= record.experience_to_level(self.exp_per_level) {
            record.level += 1;
            record.experience -= (record.level - 1) * self.exp_per_level;
            levels_gained += 1;
        }

        record.wins = record.wins.saturating_add(report.enemies_killed);

        let mut soldiers_lost = 0;
        if !report.retreated {
            soldiers_lost = record.soldiers;
            record.losses = record.losses.saturating_add(1);
            record.soldiers = 0;
        }

        BattlefieldSettlement {
            report,
            experience_gained,
            levels_gained,
            soldiers_lost,
        }
    }
}
