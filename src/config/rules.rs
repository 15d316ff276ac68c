//! Numeric tuning for the economy, battles and the battlefield

use crate::error::{Result, WarfareError};
use serde::{Deserialize, Serialize};

/// All tunable game constants. Any field missing from a JSON document keeps
/// its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub economy: EconomyRules,
    pub battle: BattleRules,
    pub battlefield: BattlefieldRules,
    /// Experience needed per level: a level `n` player needs `n * exp_per_level`
    pub exp_per_level: u64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            economy: EconomyRules::default(),
            battle: BattleRules::default(),
            battlefield: BattlefieldRules::default(),
            exp_per_level: 100,
        }
    }
}

/// Prices, income and donation thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyRules {
    pub starting_money: u64,
    pub donation_required: u64,
    pub income_cooldown_secs: i64,
    pub income_per_soldier: u64,
    pub soldier_base_cost: u64,
    pub soldier_cost_per_age: u64,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            starting_money: 100,
            donation_required: 1000,
            income_cooldown_secs: 60,
            income_per_soldier: 5,
            soldier_base_cost: 50,
            soldier_cost_per_age: 25,
        }
    }
}

/// Power formula and rewards of a single resolved battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleRules {
    pub base_power: i64,
    pub power_per_level: i64,
    pub power_per_soldier: i64,
    pub armor_bonus: i64,
    pub enemy_base: i64,
    pub enemy_power_per_age: i64,
    pub enemy_spread_below: i64,
    pub enemy_spread_above: i64,
    pub advantage_chance: f64,
    pub advantage_bonus: i64,
    pub weakness_chance: f64,
    pub weakness_penalty: i64,
    pub victory_bonus_divisor: i64,
    pub victory_bonus_cap: i64,
    pub gold_reward_min: u64,
    pub gold_reward_max: u64,
    pub gold_reward_per_age: u64,
    pub exp_reward_min: u64,
    pub exp_reward_max: u64,
    pub gold_loss_min: u64,
    pub gold_loss_max: u64,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            base_power: 30,
            power_per_level: 15,
            power_per_soldier: 8,
            armor_bonus: 15,
            enemy_base: 40,
            enemy_power_per_age: 15,
            enemy_spread_below: 20,
            enemy_spread_above: 30,
            advantage_chance: 0.40,
            advantage_bonus: 25,
            weakness_chance: 0.25,
            weakness_penalty: 15,
            victory_bonus_divisor: 10,
            victory_bonus_cap: 30,
            gold_reward_min: 25,
            gold_reward_max: 60,
            gold_reward_per_age: 12,
            exp_reward_min: 15,
            exp_reward_max: 35,
            gold_loss_min: 8,
            gold_loss_max: 25,
        }
    }
}

/// Battlefield grid layout and settlement rewards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlefieldRules {
    pub width: i32,
    pub height: i32,
    pub max_soldier_markers: u64,
    pub soldier_x_min: i32,
    pub soldier_x_max: i32,
    pub soldier_y_min: i32,
    pub soldier_y_max: i32,
    pub enemy_count_min: usize,
    pub enemy_count_max: usize,
    pub spawn_x: f64,
    pub spawn_y: f64,
    pub spawn_clearance: f64,
    pub exp_per_kill: u64,
    pub seconds_per_exp: u64,
}

impl Default for BattlefieldRules {
    fn default() -> Self {
        Self {
            width: 30,
            height: 20,
            max_soldier_markers: 20,
            soldier_x_min: 5,
            soldier_x_max: 10,
            soldier_y_min: 7,
            soldier_y_max: 12,
            enemy_count_min: 15,
            enemy_count_max: 25,
            spawn_x: 7.5,
            spawn_y: 9.0,
            spawn_clearance: 3.0,
            exp_per_kill: 5,
            seconds_per_exp: 2,
        }
    }
}

impl GameRules {
    /// Parse rules from a (possibly partial) JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: GameRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reject tuning the engines cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.exp_per_level == 0 {
            return Err(WarfareError::validation("exp_per_level", "must be positive"));
        }
        if self.economy.donation_required == 0 {
            return Err(WarfareError::validation(
                "economy.donation_required",
                "must be positive",
            ));
        }
        if self.economy.income_cooldown_secs < 0 {
            return Err(WarfareError::validation(
                "economy.income_cooldown_secs",
                "must not be negative",
            ));
        }

        let battle = &self.battle;
        for (field, chance) in [
            ("battle.advantage_chance", battle.advantage_chance),
            ("battle.weakness_chance", battle.weakness_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(WarfareError::validation(field, "must be within [0, 1]"));
            }
        }
        if battle.victory_bonus_divisor <= 0 {
            return Err(WarfareError::validation(
                "battle.victory_bonus_divisor",
                "must be positive",
            ));
        }
        if battle.enemy_spread_below < 0 || battle.enemy_spread_above < 0 {
            return Err(WarfareError::validation(
                "battle.enemy_spread",
                "must not be negative",
            ));
        }
        for (field, min, max) in [
            ("battle.gold_reward", battle.gold_reward_min, battle.gold_reward_max),
            ("battle.exp_reward", battle.exp_reward_min, battle.exp_reward_max),
            ("battle.gold_loss", battle.gold_loss_min, battle.gold_loss_max),
        ] {
            if min > max {
                return Err(WarfareError::validation(field, "min exceeds max"));
            }
        }

        let field = &self.battlefield;
        if field.width <= 0 || field.height <= 0 {
            return Err(WarfareError::validation(
                "battlefield.size",
                "width and height must be positive",
            ));
        }
        if field.soldier_x_min > field.soldier_x_max || field.soldier_y_min > field.soldier_y_max {
            return Err(WarfareError::validation(
                "battlefield.soldier_area",
                "min exceeds max",
            ));
        }
        if field.enemy_count_min > field.enemy_count_max {
            return Err(WarfareError::validation(
                "battlefield.enemy_count",
                "min exceeds max",
            ));
        }
        if field.seconds_per_exp == 0 {
            return Err(WarfareError::validation(
                "battlefield.seconds_per_exp",
                "must be positive",
            ));
        }

        Ok(())
    }
}
