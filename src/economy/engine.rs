//! Scroll purchases, recruitment, passive income and age advancement

use crate::config::{AgeCatalog, EconomyRules, SoldierProfile, SoldierProfileTable};
use crate::error::{Result, SelectionKind, WarfareError};
use crate::player::PlayerRecord;
use std::fmt;

/// Result of a funds-gated purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub cost: u64,
    /// Gold left after paying
    pub money: u64,
    /// Scrolls or soldiers owned after the purchase
    pub owned: u64,
}

/// Result of a passive income collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeCollection {
    pub income: u64,
    pub money: u64,
}

/// What a donation achieved. The gold is spent in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonationOutcome {
    /// Threshold met with a scroll in hand; the player moved up one age
    Advanced {
        from: &'static str,
        to: &'static str,
        dismissed_soldiers: u64,
    },
    /// Threshold met but no scroll to consume
    NeedsScroll { progress: u64, required: u64 },
    /// Already at the last age
    MaxAge { donated: u64 },
    /// Still short of the threshold
    Progress { donated: u64, needed: u64 },
}

impl DonationOutcome {
    pub fn advanced(&self) -> bool {
        matches!(self, DonationOutcome::Advanced { .. })
    }
}

impl fmt::Display for DonationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DonationOutcome::Advanced {
                from,
                to,
                dismissed_soldiers,
            } => write!(
                f,
                "🎉 Advanced from {} to {}! {} soldiers were outdated and dismissed. \
                 1 scroll consumed. Choose new country and armor!",
                from, to, dismissed_soldiers
            ),
            DonationOutcome::NeedsScroll { progress, required } => write!(
                f,
                "❌ You need at least 1 scroll to advance to the next age! \
                 Donation progress: {}/{}. Buy scrolls first!",
                progress, required
            ),
            DonationOutcome::MaxAge { donated } => write!(
                f,
                "🏆 You've reached the maximum age! Donated {} gold anyway.",
                donated
            ),
            DonationOutcome::Progress { donated, needed } => write!(
                f,
                "💰 Donated {} gold! Need {} more gold to advance. (Also need 1 scroll!)",
                donated, needed
            ),
        }
    }
}

/// Economy operations over a player record
///
/// Every failing operation leaves the record untouched.
#[derive(Debug, Clone, Copy)]
pub struct EconomyEngine<'a> {
    catalog: &'a AgeCatalog,
    profiles: &'a SoldierProfileTable,
    rules: &'a EconomyRules,
}

impl<'a> EconomyEngine<'a> {
    pub fn new(
        catalog: &'a AgeCatalog,
        profiles: &'a SoldierProfileTable,
        rules: &'a EconomyRules,
    ) -> Self {
        Self {
            catalog,
            profiles,
            rules,
        }
    }

    /// Price of a scroll in the player's current age
    pub fn scroll_cost(&self, record: &PlayerRecord) -> Result<u64> {
        Ok(record.current_age(self.catalog)?.scroll_cost)
    }

    /// Price of one soldier: base + per-age surcharge
    pub fn soldier_cost(&self, record: &PlayerRecord) -> u64 {
        self.rules
            .soldier_cost_per_age
            .saturating_mul(u64::from(record.age))
            .saturating_add(self.rules.soldier_base_cost)
    }

    pub fn buy_scroll(&self, record: &mut PlayerRecord) -> Result<Purchase> {
        let cost = self.scroll_cost(record)?;
        spend(record, cost)?;
        record.scrolls = record.scrolls.saturating_add(1);

        Ok(Purchase {
            cost,
            money: record.money,
            owned: record.scrolls,
        })
    }

    pub fn recruit_soldier(&self, record: &mut PlayerRecord) -> Result<Purchase> {
        let cost = self.soldier_cost(record);
        spend(record, cost)?;
        record.soldiers = record.soldiers.saturating_add(1);

        Ok(Purchase {
            cost,
            money: record.money,
            owned: record.soldiers,
        })
    }

    /// Pay out soldier income if the cooldown has elapsed at `now` (unix seconds)
    pub fn collect_income(&self, record: &mut PlayerRecord, now: i64) -> Result<IncomeCollection> {
        let elapsed = now.saturating_sub(record.last_soldier_income);
        let cooldown = self.rules.income_cooldown_secs;
        if elapsed < cooldown {
            // a collection stamped in the future still waits one cooldown at most
            return Err(WarfareError::CooldownActive {
                remaining: cooldown.saturating_sub(elapsed).min(cooldown),
            });
        }

        let income = record.soldiers.saturating_mul(self.rules.income_per_soldier);
        record.money = record.money.saturating_add(income);
        record.last_soldier_income = now;

        Ok(IncomeCollection {
            income,
            money: record.money,
        })
    }

    /// Donate gold towards the next age
    ///
    /// The donation is deducted and counted even when it cannot trigger an
    /// advance. Advancing consumes one scroll and dismisses all soldiers
    /// together with the country and armor choice.
    pub fn donate(&self, record: &mut PlayerRecord, amount: u64) -> Result<DonationOutcome> {
        spend(record, amount)?;
        record.donation_progress = record.donation_progress.saturating_add(amount);

        let required = self.rules.donation_required;
        if record.age >= self.catalog.max_index() {
            return Ok(DonationOutcome::MaxAge { donated: amount });
        }
        if record.donation_progress < required {
            return Ok(DonationOutcome::Progress {
                donated: amount,
                needed: required - record.donation_progress,
            });
        }
        if record.scrolls == 0 {
            return Ok(DonationOutcome::NeedsScroll {
                progress: record.donation_progress,
                required,
            });
        }

        let from = record.current_age(self.catalog)?.name;
        let to = self.catalog.definition(record.age + 1)?.name;
        let dismissed_soldiers = record.soldiers;

        record.age += 1;
        record.donation_progress = 0;
        record.scrolls -= 1;
        record.soldiers = 0;
        record.country.clear();
        record.armor.clear();

        Ok(DonationOutcome::Advanced {
            from,
            to,
            dismissed_soldiers,
        })
    }

    /// Join one of the current age's countries
    pub fn choose_country(&self, record: &mut PlayerRecord, country: &str) -> Result<SoldierProfile> {
        let age = record.current_age(self.catalog)?;
        if !age.has_country(country) {
            return Err(WarfareError::InvalidSelection {
                kind: SelectionKind::Country,
                value: country.to_string(),
            });
        }

        record.country = country.to_string();
        Ok(self.profiles.profile(country))
    }

    /// Equip one of the current age's armor pieces
    pub fn choose_armor(&self, record: &mut PlayerRecord, armor: &str) -> Result<()> {
        let age = record.current_age(self.catalog)?;
        if !age.has_armor(armor) {
            return Err(WarfareError::InvalidSelection {
                kind: SelectionKind::Armor,
                value: armor.to_string(),
            });
        }

        record.armor = armor.to_string();
        Ok(())
    }
}

/// Deduct `cost` or fail without touching the record
#[inline]
fn spend(record: &mut PlayerRecord, cost: u64) -> Result<()> {
    if record.money < cost {
        return Err(WarfareError::InsufficientFunds {
            cost,
            available: record.money,
        });
    }
    record.money -= cost;
    Ok(())
}
