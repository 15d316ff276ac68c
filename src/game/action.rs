//! Player actions and their decoding from client form fields

use crate::battlefield::BattlefieldReport;
use crate::error::{Result, WarfareError};
use crate::game::input::{parse_amount, parse_coordinate, parse_flag, require};
use crate::player::Position;
use std::collections::HashMap;

/// One request from a player
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    CreatePlayer { name: String },
    BuyScroll,
    RecruitSoldier,
    CollectIncome,
    Donate { amount: u64 },
    ChooseCountry { country: String },
    ChooseArmor { armor: String },
    StartBattlefield,
    MovePlayer { position: Position },
    EndBattlefield { report: BattlefieldReport },
    ResolveBattle,
    Reset,
}

impl Action {
    /// Decode an action from its route name and form fields
    ///
    /// Both the operation names and the legacy route names
    /// (`start_game`, `battle`, `enter_battlefield`) are accepted.
    pub fn from_form(route: &str, form: &HashMap<String, String>) -> Result<Self> {
        let text = |field: &str| form.get(field).cloned().unwrap_or_default();

        let action = match route {
            "create_player" | "start_game" => Action::CreatePlayer { name: text("name") },
            "buy_scroll" => Action::BuyScroll,
            "recruit_soldier" => Action::RecruitSoldier,
            "collect_income" => Action::CollectIncome,
            "donate" => Action::Donate {
                amount: parse_amount("amount", require(form, "amount")?)?,
            },
            "choose_country" => Action::ChooseCountry {
                country: text("country"),
            },
            "choose_armor" => Action::ChooseArmor {
                armor: text("armor"),
            },
            "start_battlefield" | "enter_battlefield" => Action::StartBattlefield,
            "move_player" => Action::MovePlayer {
                position: Position {
                    x: parse_coordinate("x", require(form, "x")?)?,
                    y: parse_coordinate("y", require(form, "y")?)?,
                },
            },
            "end_battlefield" => Action::EndBattlefield {
                report: BattlefieldReport {
                    enemies_killed: parse_amount("enemies_killed", require(form, "enemies_killed")?)?,
                    time_survived: parse_amount("time_survived", require(form, "time_survived")?)?,
                    gold_earned: parse_amount("gold_earned", require(form, "gold_earned")?)?,
                    retreated: parse_flag(form.get("retreated").map(String::as_str)),
                },
            },
            "resolve_battle" | "battle" => Action::ResolveBattle,
            "reset" => Action::Reset,
            other => {
                return Err(WarfareError::validation(
                    "action",
                    format!("unknown action {:?}", other),
                ))
            }
        };

        Ok(action)
    }
}
