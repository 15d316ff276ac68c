//! Request cycle: load a record, apply one action, save it back
//!
//! Each action holds the player's lock for its whole read-modify-write cycle
//! so concurrent requests for one identity cannot overwrite each other.
//! Gateway trouble never reaches the player: the cycle continues against an
//! in-process fallback store instead.

use crate::battle::{BattleResolver, BattleSpoils};
use crate::battlefield::{BattlefieldReport, BattlefieldSimulator};
use crate::config::{AgeCatalog, GameRules, SoldierProfile, SoldierProfileTable};
use crate::economy::EconomyEngine;
use crate::error::Result;
use crate::game::action::Action;
use crate::game::input::check_coordinate;
use crate::game::response::{ActionResponse, PlayerView, ResponseData};
use crate::player::{PlayerRecord, Position};
use crate::rng::GameRng;
use crate::store::{MemoryGateway, PersistenceGateway, PlayerLocks};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Game front door over a persistence gateway
pub struct GameService<G: PersistenceGateway> {
    gateway: G,
    fallback: MemoryGateway,
    locks: PlayerLocks,
    rules: GameRules,
    catalog: &'static AgeCatalog,
    profiles: &'static SoldierProfileTable,
    rng: Mutex<GameRng>,
}

impl<G: PersistenceGateway> GameService<G> {
    /// Service with an entropy-seeded random source
    pub fn new(gateway: G, rules: GameRules) -> Result<Self> {
        Self::with_rng(gateway, rules, GameRng::from_entropy())
    }

    /// Service whose battles and layouts are reproducible
    pub fn with_seed(gateway: G, rules: GameRules, seed: u64) -> Result<Self> {
        Self::with_rng(gateway, rules, GameRng::new(seed))
    }

    pub fn with_rng(gateway: G, rules: GameRules, rng: GameRng) -> Result<Self> {
        rules.validate()?;
        Ok(Self {
            gateway,
            fallback: MemoryGateway::new(),
            locks: PlayerLocks::new(),
            rules,
            catalog: AgeCatalog::standard(),
            profiles: SoldierProfileTable::standard(),
            rng: Mutex::new(rng),
        })
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn economy(&self) -> EconomyEngine<'_> {
        EconomyEngine::new(self.catalog, self.profiles, &self.rules.economy)
    }

    fn resolver(&self) -> BattleResolver<'_> {
        BattleResolver::new(
            self.catalog,
            self.profiles,
            &self.rules.battle,
            self.rules.exp_per_level,
        )
    }

    fn battlefield(&self) -> BattlefieldSimulator<'_> {
        BattlefieldSimulator::new(&self.rules.battlefield, self.rules.exp_per_level)
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Run one decoded action
    pub fn handle(&self, player_id: &str, action: Action) -> ActionResponse {
        match action {
            Action::CreatePlayer { name } => self.create_player(player_id, &name),
            Action::BuyScroll => self.buy_scroll(player_id),
            Action::RecruitSoldier => self.recruit_soldier(player_id),
            Action::CollectIncome => self.collect_income(player_id),
            Action::Donate { amount } => self.donate(player_id, amount),
            Action::ChooseCountry { country } => self.choose_country(player_id, &country),
            Action::ChooseArmor { armor } => self.choose_armor(player_id, &armor),
            Action::StartBattlefield => self.start_battlefield(player_id),
            Action::MovePlayer { position } => self.move_player(player_id, position.x, position.y),
            Action::EndBattlefield { report } => self.end_battlefield(player_id, report),
            Action::ResolveBattle => self.resolve_battle(player_id),
            Action::Reset => self.reset(player_id),
        }
    }

    /// Decode raw form input and run it; malformed input is a failed response
    pub fn handle_form(
        &self,
        player_id: &str,
        route: &str,
        form: &HashMap<String, String>,
    ) -> ActionResponse {
        match Action::from_form(route, form) {
            Ok(action) => self.handle(player_id, action),
            Err(err) => {
                debug!(player_id, route, error = %err, "rejected malformed input");
                ActionResponse::failure(err.user_message())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    /// Name the player; an empty (or blank) name does nothing
    pub fn create_player(&self, player_id: &str, name: &str) -> ActionResponse {
        let name = name.trim();
        if name.is_empty() {
            return ActionResponse::failure("");
        }

        respond(self.mutate(player_id, |record| {
            record.name = name.to_string();
            Ok(())
        }))
        .map(|()| {
            info!(player_id, name, "player created");
            ActionResponse::ok(format!("Welcome, {}!", name))
        })
        .unwrap_or_else(|failure| failure)
    }

    pub fn buy_scroll(&self, player_id: &str) -> ActionResponse {
        let economy = self.economy();
        respond(self.mutate(player_id, |record| economy.buy_scroll(record)))
            .map(|purchase| {
                ActionResponse::ok_with(
                    format!("Bought scroll for {} gold!", purchase.cost),
                    ResponseData::Scrolls {
                        scrolls: purchase.owned,
                        money: purchase.money,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    pub fn recruit_soldier(&self, player_id: &str) -> ActionResponse {
        let economy = self.economy();
        respond(self.mutate(player_id, |record| economy.recruit_soldier(record)))
            .map(|purchase| {
                ActionResponse::ok_with(
                    format!("Recruited soldier for {} gold!", purchase.cost),
                    ResponseData::Soldiers {
                        soldiers: purchase.owned,
                        money: purchase.money,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    /// Collect soldier income at the current wall-clock time
    pub fn collect_income(&self, player_id: &str) -> ActionResponse {
        self.collect_income_at(player_id, unix_now())
    }

    /// Collect soldier income at `now` (unix seconds)
    pub fn collect_income_at(&self, player_id: &str, now: i64) -> ActionResponse {
        let economy = self.economy();
        respond(self.mutate(player_id, |record| economy.collect_income(record, now)))
            .map(|collected| {
                ActionResponse::ok_with(
                    format!("Collected {} gold from soldiers!", collected.income),
                    ResponseData::Income {
                        income: collected.income,
                        money: collected.money,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    pub fn donate(&self, player_id: &str, amount: u64) -> ActionResponse {
        let economy = self.economy();
        let result = self.mutate(player_id, |record| {
            let outcome = economy.donate(record, amount)?;
            Ok((outcome, record.age, record.donation_progress, record.money))
        });

        respond(result)
            .map(|(outcome, age, donation_progress, money)| {
                if outcome.advanced() {
                    info!(player_id, age, "player advanced to a new age");
                }
                ActionResponse::ok_with(
                    outcome.to_string(),
                    ResponseData::Donation {
                        advanced: outcome.advanced(),
                        age,
                        donation_progress,
                        money,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    pub fn choose_country(&self, player_id: &str, country: &str) -> ActionResponse {
        let economy = self.economy();
        respond(self.mutate(player_id, |record| economy.choose_country(record, country)))
            .map(|profile| {
                ActionResponse::ok_with(
                    format!("Joined {}!", country),
                    ResponseData::Country {
                        advantage: profile.advantage,
                        weakness: profile.weakness,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    pub fn choose_armor(&self, player_id: &str, armor: &str) -> ActionResponse {
        let economy = self.economy();
        respond(self.mutate(player_id, |record| economy.choose_armor(record, armor)))
            .map(|()| ActionResponse::ok(format!("Equipped {}!", armor)))
            .unwrap_or_else(|failure| failure)
    }

    /// Fight one battle against a generated enemy
    pub fn resolve_battle(&self, player_id: &str) -> ActionResponse {
        let resolver = self.resolver();
        let result = self.mutate(player_id, |record| {
            let mut rng = self.rng.lock();
            resolver.resolve(record, &mut *rng)
        });

        respond(result)
            .map(|report| {
                let leveled_up = matches!(report.spoils, BattleSpoils::Victory { leveled_up: true, .. });
                debug!(
                    player_id,
                    win = report.win(),
                    player_power = report.matchup.player_power,
                    enemy_power = report.matchup.enemy_power,
                    "battle resolved"
                );
                ActionResponse::ok_with(
                    report.narrative(),
                    ResponseData::Battle {
                        win: report.win(),
                        player_power: report.matchup.player_power,
                        enemy_power: report.matchup.enemy_power,
                        leveled_up,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    /// Generate a battlefield layout; the stored record is not modified
    pub fn start_battlefield(&self, player_id: &str) -> ActionResponse {
        let simulator = self.battlefield();
        let result = self.inspect(player_id, |record| {
            let mut rng = self.rng.lock();
            simulator.start(record, &mut *rng)
        });

        respond(result)
            .map(|encounter| {
                ActionResponse::ok_with(
                    "Entering battlefield...",
                    ResponseData::Battlefield {
                        soldiers: encounter.soldiers,
                        battlefield_map: encounter.map,
                        player_x: encounter.position.x,
                        player_y: encounter.position.y,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    /// Store a new battlefield position; only non-finite values are refused
    pub fn move_player(&self, player_id: &str, x: f64, y: f64) -> ActionResponse {
        if let Err(err) = check_coordinate("x", x).and_then(|_| check_coordinate("y", y)) {
            return ActionResponse::failure(err.user_message());
        }

        let simulator = self.battlefield();
        respond(self.mutate(player_id, |record| {
            simulator.move_to(record, Position { x, y });
            Ok(())
        }))
        .map(|()| ActionResponse::ok(""))
        .unwrap_or_else(|failure| failure)
    }

    /// Settle an encounter from client-reported counters
    pub fn end_battlefield(&self, player_id: &str, report: BattlefieldReport) -> ActionResponse {
        debug!(
            player_id,
            enemies_killed = report.enemies_killed,
            time_survived = report.time_survived,
            gold_earned = report.gold_earned,
            retreated = report.retreated,
            "accepting client-reported battlefield result"
        );

        let simulator = self.battlefield();
        respond(self.mutate(player_id, |record| Ok(simulator.end(record, report))))
            .map(|settlement| {
                ActionResponse::ok_with(
                    settlement.to_string(),
                    ResponseData::Settlement {
                        experience_gained: settlement.experience_gained,
                        levels_gained: settlement.levels_gained,
                        soldiers_lost: settlement.soldiers_lost,
                    },
                )
            })
            .unwrap_or_else(|failure| failure)
    }

    /// Drop ephemeral state for the player; the persisted record stays
    pub fn reset(&self, player_id: &str) -> ActionResponse {
        self.locks.with_lock(player_id, || {
            self.fallback.remove(player_id);
        });
        ActionResponse::ok("Game reset successfully!")
    }

    /// Current record with its age tier and soldier profile
    pub fn player_view(&self, player_id: &str) -> Result<PlayerView> {
        let economy = self.economy();
        self.inspect(player_id, |record| {
            let current_age = self.catalog.definition(record.age)?;
            let soldier_info = if record.has_country() {
                self.profiles.profile(&record.country)
            } else {
                SoldierProfile::NONE
            };
            Ok(PlayerView {
                created: record.is_created(),
                player: record.clone(),
                current_age,
                soldier_info,
                scroll_cost: current_age.scroll_cost,
                soldier_cost: economy.soldier_cost(record),
                donation_required: self.rules.economy.donation_required,
            })
        })
    }

    // ------------------------------------------------------------------------
    // Record cycle
    // ------------------------------------------------------------------------

    /// Load, apply `f`, and save on success. A failing `f` saves nothing.
    fn mutate<T>(
        &self,
        player_id: &str,
        f: impl FnOnce(&mut PlayerRecord) -> Result<T>,
    ) -> Result<T> {
        self.locks.with_lock(player_id, || {
            let (mut record, origin) = self.load(player_id);
            let value = f(&mut record)?;
            self.save(player_id, &record, origin);
            Ok(value)
        })
    }

    /// Load and read without saving
    fn inspect<T>(&self, player_id: &str, f: impl FnOnce(&PlayerRecord) -> Result<T>) -> Result<T> {
        self.locks.with_lock(player_id, || f(&self.load(player_id).0))
    }

    /// Fetch a record, creating it on first access. Never fails.
    ///
    /// A record that could not be read from the gateway comes from the
    /// fallback store and must only ever be written back there, so the
    /// persisted record survives until the gateway answers again.
    fn load(&self, player_id: &str) -> (PlayerRecord, Origin) {
        match self.gateway.get(player_id) {
            Ok(Some(json)) => match self.decode(&json) {
                Ok(record) => (record, Origin::Gateway),
                Err(err) => {
                    warn!(player_id, error = %err, "stored record unusable, using fallback store");
                    (self.load_fallback(player_id), Origin::Fallback)
                }
            },
            Ok(None) => {
                let record = PlayerRecord::new(self.rules.economy.starting_money);
                info!(player_id, "new player record");
                self.save(player_id, &record, Origin::Gateway);
                (record, Origin::Gateway)
            }
            Err(err) => {
                warn!(player_id, error = %err, "gateway read failed, using fallback store");
                (self.load_fallback(player_id), Origin::Fallback)
            }
        }
    }

    fn decode(&self, json: &str) -> Result<PlayerRecord> {
        let record = PlayerRecord::from_json(json)?;
        record.validate(self.catalog)?;
        Ok(record)
    }

    fn load_fallback(&self, player_id: &str) -> PlayerRecord {
        self.fallback
            .get(player_id)
            .ok()
            .flatten()
            .and_then(|json| self.decode(&json).ok())
            .unwrap_or_else(|| PlayerRecord::new(self.rules.economy.starting_money))
    }

    /// Write a record back where it was loaded from
    ///
    /// Gateway records fall back to the ephemeral store when the write fails.
    fn save(&self, player_id: &str, record: &PlayerRecord, origin: Origin) {
        let json = match record.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!(player_id, error = %err, "record could not be encoded");
                return;
            }
        };

        let json = match origin {
            Origin::Fallback => json,
            Origin::Gateway => match self.gateway.set(player_id, json.clone()) {
                Ok(()) => return,
                Err(err) => {
                    warn!(player_id, error = %err, "gateway write failed, using fallback store");
                    json
                }
            },
        };

        if let Err(err) = self.fallback.set(player_id, json) {
            warn!(player_id, error = %err, "fallback write failed, progress of this action is lost");
        }
    }
}

/// Store a loaded record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Gateway,
    Fallback,
}

/// Turn gameplay errors into failed responses; everything else is logged
fn respond<T>(result: Result<T>) -> std::result::Result<T, ActionResponse> {
    result.map_err(|err| {
        if !err.is_gameplay() {
            warn!(error = %err, "action failed");
        }
        ActionResponse::failure(err.user_message())
    })
}

/// Current unix time in whole seconds
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WarfareError;
    use std::sync::Arc;
    use std::thread;

    const PLAYER: &str = "player-1";

    fn service() -> GameService<MemoryGateway> {
        GameService::with_seed(MemoryGateway::new(), GameRules::default(), 7).unwrap()
    }

    fn seeded(record: &PlayerRecord) -> GameService<MemoryGateway> {
        let service = service();
        service
            .gateway()
            .set(PLAYER, record.to_json().unwrap())
            .unwrap();
        service
    }

    fn stored(service: &GameService<MemoryGateway>) -> PlayerRecord {
        service.player_view(PLAYER).unwrap().player
    }

    /// Gateway whose every call fails
    struct BrokenGateway;

    /// In-memory gateway whose first `reads_failing` reads time out
    struct FlakyGateway {
        records: MemoryGateway,
        reads_failing: Mutex<u32>,
    }

    impl FlakyGateway {
        fn new(reads_failing: u32) -> Self {
            Self {
                records: MemoryGateway::new(),
                reads_failing: Mutex::new(reads_failing),
            }
        }
    }

    impl PersistenceGateway for FlakyGateway {
        fn get(&self, player_id: &str) -> Result<Option<String>> {
            let mut remaining = self.reads_failing.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(WarfareError::Persistence("timeout".to_string()));
            }
            self.records.get(player_id)
        }

        fn set(&self, player_id: &str, record: String) -> Result<()> {
            self.records.set(player_id, record)
        }
    }

    impl PersistenceGateway for BrokenGateway {
        fn get(&self, _player_id: &str) -> Result<Option<String>> {
            Err(WarfareError::Persistence("connection refused".to_string()))
        }

        fn set(&self, _player_id: &str, _record: String) -> Result<()> {
            Err(WarfareError::Persistence("connection refused".to_string()))
        }
    }

    #[test]
    fn test_first_access_persists_default_record() {
        let service = service();
        let view = service.player_view(PLAYER).unwrap();

        assert!(!view.created);
        assert_eq!(view.player.money, 100);
        assert_eq!(view.current_age.name, "Neolithic");
        assert_eq!(view.soldier_info, SoldierProfile::NONE);
        assert!(service.gateway().contains(PLAYER));
    }

    #[test]
    fn test_create_player() {
        let service = service();
        assert!(service.create_player(PLAYER, "  Leonidas ").success);
        let view = service.player_view(PLAYER).unwrap();
        assert!(view.created);
        assert_eq!(view.player.name, "Leonidas");
    }

    #[test]
    fn test_create_player_blank_name_is_noop() {
        let service = service();
        let response = service.create_player(PLAYER, "   ");
        assert!(!response.success);
        assert!(!service.gateway().contains(PLAYER));
    }

    #[test]
    fn test_buy_scroll_until_broke() {
        let service = service();

        let first = service.buy_scroll(PLAYER);
        assert!(first.success);
        assert_eq!(first.message, "Bought scroll for 50 gold!");
        assert_eq!(
            first.data,
            Some(ResponseData::Scrolls {
                scrolls: 1,
                money: 50
            })
        );
        assert!(service.buy_scroll(PLAYER).success);

        let broke = service.buy_scroll(PLAYER);
        assert!(!broke.success);
        assert_eq!(broke.message, "Not enough gold!");
        assert_eq!(stored(&service).scrolls, 2);
        assert_eq!(stored(&service).money, 0);
    }

    #[test]
    fn test_recruit_soldier_cost_scales_with_age() {
        let record = PlayerRecord {
            age: 2,
            money: 500,
            ..Default::default()
        };
        let service = seeded(&record);

        let response = service.recruit_soldier(PLAYER);
        assert_eq!(response.message, "Recruited soldier for 100 gold!");
        assert_eq!(stored(&service).money, 400);
    }

    #[test]
    fn test_income_cooldown() {
        let record = PlayerRecord {
            soldiers: 4,
            last_soldier_income: 1_000,
            ..Default::default()
        };
        let service = seeded(&record);

        let early = service.collect_income_at(PLAYER, 1_030);
        assert!(!early.success);
        assert_eq!(early.message, "Wait 30 seconds!");

        let ready = service.collect_income_at(PLAYER, 1_060);
        assert!(ready.success);
        assert_eq!(ready.message, "Collected 20 gold from soldiers!");
        assert_eq!(stored(&service).money, 120);
        assert_eq!(stored(&service).last_soldier_income, 1_060);
    }

    #[test]
    fn test_donation_advances_age() {
        let record = PlayerRecord {
            donation_progress: 950,
            scrolls: 1,
            soldiers: 3,
            country: "Settlers".to_string(),
            ..Default::default()
        };
        let service = seeded(&record);

        let response = service.donate(PLAYER, 50);
        assert!(response.success);
        assert_eq!(
            response.data,
            Some(ResponseData::Donation {
                advanced: true,
                age: 1,
                donation_progress: 0,
                money: 50
            })
        );

        let after = stored(&service);
        assert_eq!(after.age, 1);
        assert_eq!(after.scrolls, 0);
        assert_eq!(after.soldiers, 0);
        assert!(after.country.is_empty());
    }

    #[test]
    fn test_donation_beyond_means() {
        let service = service();
        let response = service.donate(PLAYER, 101);
        assert!(!response.success);
        assert_eq!(stored(&service).donation_progress, 0);
    }

    #[test]
    fn test_choose_country_and_armor() {
        let service = service();

        let joined = service.choose_country(PLAYER, "Settlers");
        assert!(joined.success);
        assert_eq!(joined.message, "Joined Settlers!");

        let rejected = service.choose_country(PLAYER, "Sparta");
        assert_eq!(rejected.message, "Invalid country!");
        assert_eq!(service.choose_armor(PLAYER, "Knight's Plate").message, "Invalid armor!");
        assert_eq!(stored(&service).country, "Settlers");
    }

    #[test]
    fn test_battle_updates_counters() {
        let service = service();
        for _ in 0..10 {
            let response = service.resolve_battle(PLAYER);
            assert!(response.success);
        }
        let after = stored(&service);
        assert_eq!(after.wins + after.losses, 10);
    }

    #[test]
    fn test_battlefield_requires_soldiers() {
        let service = service();
        let response = service.start_battlefield(PLAYER);
        assert!(!response.success);
        assert_eq!(response.message, "You need soldiers to enter the battlefield!");
    }

    #[test]
    fn test_battlefield_round() {
        let record = PlayerRecord {
            soldiers: 5,
            ..Default::default()
        };
        let service = seeded(&record);

        let started = service.start_battlefield(PLAYER);
        assert!(started.success);
        assert_eq!(started.message, "Entering battlefield...");
        assert!(service.move_player(PLAYER, 12.0, 4.5).success);
        assert!(!service.move_player(PLAYER, f64::NAN, 4.5).success);

        let report = BattlefieldReport {
            enemies_killed: 10,
            time_survived: 40,
            gold_earned: 200,
            retreated: false,
        };
        let ended = service.end_battlefield(PLAYER, report);
        assert!(ended.success);

        let after = stored(&service);
        assert_eq!(after.position, Position { x: 12.0, y: 4.5 });
        assert_eq!(after.money, 300);
        assert_eq!(after.experience, 70);
        assert_eq!(after.soldiers, 0);
        assert_eq!(after.losses, 1);
        assert_eq!(after.wins, 10);
    }

    #[test]
    fn test_handle_form() {
        let service = service();
        let mut form = HashMap::new();
        form.insert("amount".to_string(), "abc".to_string());

        let malformed = service.handle_form(PLAYER, "donate", &form);
        assert!(!malformed.success);
        assert_eq!(stored(&service).money, 100);

        form.insert("amount".to_string(), "40".to_string());
        assert!(service.handle_form(PLAYER, "donate", &form).success);
        assert_eq!(stored(&service).money, 60);
    }

    #[test]
    fn test_broken_gateway_uses_fallback() {
        let service = GameService::with_seed(BrokenGateway, GameRules::default(), 1).unwrap();

        assert!(service.buy_scroll(PLAYER).success);
        assert!(service.buy_scroll(PLAYER).success);
        assert_eq!(service.buy_scroll(PLAYER).message, "Not enough gold!");

        // reset drops the ephemeral record
        assert_eq!(service.reset(PLAYER).message, "Game reset successfully!");
        assert!(service.buy_scroll(PLAYER).success);
    }

    #[test]
    fn test_corrupt_record_uses_fallback() {
        let service = service();
        service.gateway().set(PLAYER, "{not json".to_string()).unwrap();

        assert_eq!(stored(&service).money, 100);
        assert!(service.buy_scroll(PLAYER).success);
        assert_eq!(stored(&service).scrolls, 1);
    }

    #[test]
    fn test_invalid_record_uses_fallback() {
        let record = PlayerRecord {
            age: 3,
            country: "Sparta".to_string(),
            money: 9_999,
            ..Default::default()
        };
        let service = seeded(&record);
        assert_eq!(stored(&service).money, 100);

        assert!(service.buy_scroll(PLAYER).success);
        let kept = PlayerRecord::from_json(&service.gateway().get(PLAYER).unwrap().unwrap()).unwrap();
        assert_eq!(kept, record);
    }

    #[test]
    fn test_failed_read_never_overwrites_persisted_record() {
        let veteran = PlayerRecord {
            name: "Ada".to_string(),
            age: 4,
            money: 9_000,
            level: 12,
            scrolls: 3,
            ..Default::default()
        };
        let service = GameService::with_seed(FlakyGateway::new(1), GameRules::default(), 3).unwrap();
        service
            .gateway()
            .set(PLAYER, veteran.to_json().unwrap())
            .unwrap();

        // runs on a fresh fallback record while the read times out
        let response = service.buy_scroll(PLAYER);
        assert!(response.success);
        assert_eq!(
            response.data,
            Some(ResponseData::Scrolls {
                scrolls: 1,
                money: 50
            })
        );

        let persisted = service.gateway().records.get(PLAYER).unwrap().unwrap();
        assert_eq!(PlayerRecord::from_json(&persisted).unwrap(), veteran);

        // the gateway answers again and the real progress is back
        let view = service.player_view(PLAYER).unwrap();
        assert_eq!(view.player, veteran);
    }

    #[test]
    fn test_saturated_gold_keeps_later_actions_working() {
        let record = PlayerRecord {
            soldiers: 3,
            ..Default::default()
        };
        let service = seeded(&record);
        let report = BattlefieldReport {
            enemies_killed: 0,
            time_survived: 0,
            gold_earned: u64::MAX,
            retreated: true,
        };

        assert!(service.end_battlefield(PLAYER, report).success);
        assert!(service.collect_income_at(PLAYER, 10_000).success);
        for _ in 0..20 {
            assert!(service.resolve_battle(PLAYER).success);
        }
        assert!(service.end_battlefield(PLAYER, report).success);

        let after = stored(&service);
        assert!(after.money > u64::MAX - 1_000);
        assert_eq!(after.wins + after.losses, 20);
    }

    #[test]
    fn test_reset_keeps_persisted_record() {
        let service = service();
        service.buy_scroll(PLAYER);
        service.reset(PLAYER);
        assert_eq!(stored(&service).scrolls, 1);
    }

    #[test]
    fn test_concurrent_actions_are_serialised() {
        let service = Arc::new(service());
        let report = BattlefieldReport {
            enemies_killed: 0,
            time_survived: 0,
            gold_earned: 1,
            retreated: true,
        };

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    for _ in 0..25 {
                        service.end_battlefield(PLAYER, report);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stored(&service).money, 300);
    }

    #[test]
    fn test_rejects_invalid_rules() {
        let mut rules = GameRules::default();
        rules.battle.advantage_chance = 1.5;
        assert!(GameService::new(MemoryGateway::new(), rules).is_err());
    }
}
