//! Single randomized battle against a generated enemy

use crate::config::{AgeCatalog, BattleRules, SoldierProfile, SoldierProfileTable};
use crate::error::Result;
use crate::player::PlayerRecord;
use rand::Rng;

/// Both sides' strength after all random rolls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleMatchup {
    pub player_power: i64,
    pub enemy_power: i64,
    /// Bonus applied from the country's advantage roll (0 if it did not fire)
    pub advantage_bonus: i64,
    /// Penalty applied from the country's weakness roll (0 if it did not fire)
    pub weakness_penalty: i64,
}

impl BattleMatchup {
    #[inline]
    pub fn power_difference(&self) -> i64 {
        self.player_power.saturating_sub(self.enemy_power)
    }

    /// Strictly stronger wins; a tie is a loss
    #[inline]
    pub fn is_win(&self) -> bool {
        self.power_difference() > 0
    }
}

/// Rewards or losses of a settled battle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleSpoils {
    Victory {
        gold: u64,
        experience: u64,
        victory_bonus: u64,
        leveled_up: bool,
    },
    Defeat {
        gold_lost: u64,
    },
}

/// Outcome of one battle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleReport {
    pub matchup: BattleMatchup,
    pub spoils: BattleSpoils,
    /// Profile of the player's country, if one is chosen
    pub profile: Option<SoldierProfile>,
}

impl BattleReport {
    pub fn win(&self) -> bool {
        matches!(self.spoils, BattleSpoils::Victory { .. })
    }

    /// Human-readable result line including every bonus that applied
    pub fn narrative(&self) -> String {
        let weakness = if self.matchup.weakness_penalty > 0 {
            format!(" [Weakness: -{}]", self.matchup.weakness_penalty)
        } else {
            String::new()
        };

        match self.spoils {
            BattleSpoils::Victory {
                gold,
                experience,
                victory_bonus,
                ..
            } => {
                let bonus = if victory_bonus > 0 {
                    format!(" (Bonus: +{})", victory_bonus)
                } else {
                    String::new()
                };
                let advantage = if self.matchup.advantage_bonus > 0 {
                    format!(" [Advantage: +{}]", self.matchup.advantage_bonus)
                } else {
                    String::new()
                };
                format!(
                    "Victory! Gained {} gold and {} experience!{}{}{}",
                    gold, experience, bonus, advantage, weakness
                )
            }
            BattleSpoils::Defeat { gold_lost } => format!(
                "Defeat! Lost {} gold. (Power: {} vs {}){}",
                gold_lost, self.matchup.player_power, self.matchup.enemy_power, weakness
            ),
        }
    }
}

/// Resolves battles for a player record
#[derive(Debug, Clone, Copy)]
pub struct BattleResolver<'a> {
    catalog: &'a AgeCatalog,
    profiles: &'a SoldierProfileTable,
    rules: &'a BattleRules,
    exp_per_level: u64,
}

impl<'a> BattleResolver<'a> {
    pub fn new(
        catalog: &'a AgeCatalog,
        profiles: &'a SoldierProfileTable,
        rules: &'a BattleRules,
        exp_per_level: u64,
    ) -> Self {
        Self {
            catalog,
            profiles,
            rules,
            exp_per_level,
        }
    }

    /// Fight one battle and apply its result to the record
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        record: &mut PlayerRecord,
        rng: &mut R,
    ) -> Result<BattleReport> {
        // age must be in the catalog before anything is rolled
        self.catalog.definition(record.age)?;

        let matchup = self.roll_matchup(record, rng);
        let spoils = self.settle(record, &matchup, rng);
        let profile = record
            .has_country()
            .then(|| self.profiles.profile(&record.country));

        Ok(BattleReport {
            matchup,
            spoils,
            profile,
        })
    }

    /// Player strength before any country roll
    pub fn base_power(&self, record: &PlayerRecord) -> i64 {
        let rules = self.rules;
        let mut power = to_i64(record.level)
            .saturating_mul(rules.power_per_level)
            .saturating_add(to_i64(record.soldiers).saturating_mul(rules.power_per_soldier))
            .saturating_add(rules.base_power);
        if record.has_armor() {
            power = power.saturating_add(rules.armor_bonus);
        }
        power
    }

    /// Draw the enemy and the country rolls
    ///
    /// Draw order: enemy power, advantage trial, weakness trial. The two
    /// trials are independent and may both fire.
    pub fn roll_matchup<R: Rng + ?Sized>(&self, record: &PlayerRecord, rng: &mut R) -> BattleMatchup {
        let rules = self.rules;
        let mut player_power = self.base_power(record);

        let enemy_base = rules.enemy_base + i64::from(record.age) * rules.enemy_power_per_age;
        let enemy_power = rng.gen_range(
            enemy_base - rules.enemy_spread_below..=enemy_base + rules.enemy_spread_above,
        );

        let mut advantage_bonus = 0;
        let mut weakness_penalty = 0;
        if record.has_country() {
            if rng.gen::<f64>() < rules.advantage_chance {
                advantage_bonus = rules.advantage_bonus;
                player_power = player_power.saturating_add(advantage_bonus);
            }
            if rng.gen::<f64>() < rules.weakness_chance {
                weakness_penalty = rules.weakness_penalty;
                player_power = player_power.saturating_sub(weakness_penalty);
            }
        }

        BattleMatchup {
            player_power,
            enemy_power,
            advantage_bonus,
            weakness_penalty,
        }
    }

    /// Apply rewards or losses for a rolled matchup
    ///
    /// A victory levels up at most once and resets experience to zero,
    /// discarding any overflow.
    pub fn settle<R: Rng + ?Sized>(
        &self,
        record: &mut PlayerRecord,
        matchup: &BattleMatchup,
        rng: &mut R,
    ) -> BattleSpoils {
        let rules = self.rules;

        if !matchup.is_win() {
            let roll = rng.gen_range(rules.gold_loss_min..=rules.gold_loss_max);
            let gold_lost = record.money.min(roll);
            record.money -= gold_lost;
            record.losses = record.losses.saturating_add(1);
            return BattleSpoils::Defeat { gold_lost };
        }

        let victory_bonus = (matchup.power_difference() / rules.victory_bonus_divisor)
            .min(rules.victory_bonus_cap)
            .max(0) as u64;
        let gold = rng.gen_range(rules.gold_reward_min..=rules.gold_reward_max)
            + u64::from(record.age) * rules.gold_reward_per_age
            + victory_bonus;
        let experience =
            rng.gen_range(rules.exp_reward_min..=rules.exp_reward_max) + victory_bonus / 2;

        // earlier encounters may already have pushed these counters to the limit
        record.money = record.money.saturating_add(gold);
        record.experience = record.experience.saturating_add(experience);
        record.wins = record.wins.saturating_add(1);

        let leveled_up = record.experience >= record.experience_to_level(self.exp_per_level);
        if leveled_up {
            record.level = record.level.saturating_add(1);
            record.experience = 0;
        }

        BattleSpoils::Victory {
            gold,
            experience,
            victory_bonus,
            leveled_up,
        }
    }
}

#[inline]
fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
