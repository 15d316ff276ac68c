//! Structured results returned for every action

use crate::battlefield::BattlefieldMap;
use crate::config::{AgeDefinition, SoldierProfile};
use crate::player::PlayerRecord;
use serde::Serialize;

/// Action-specific fields, flattened next to `success` and `message`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Scrolls {
        scrolls: u64,
        money: u64,
    },
    Soldiers {
        soldiers: u64,
        money: u64,
    },
    Income {
        income: u64,
        money: u64,
    },
    Donation {
        advanced: bool,
        age: u32,
        donation_progress: u64,
        money: u64,
    },
    Country {
        advantage: &'static str,
        weakness: &'static str,
    },
    Battle {
        win: bool,
        player_power: i64,
        enemy_power: i64,
        leveled_up: bool,
    },
    Battlefield {
        soldiers: u64,
        battlefield_map: BattlefieldMap,
        player_x: f64,
        player_y: f64,
    },
    Settlement {
        experience_gained: u64,
        levels_gained: u64,
        soldiers_lost: u64,
    },
}

/// Result payload of one request/response exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(flatten)]
    pub data: Option<ResponseData>,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, data: ResponseData) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything needed to render a player's home screen
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub created: bool,
    pub player: PlayerRecord,
    pub current_age: &'static AgeDefinition,
    pub soldier_info: SoldierProfile,
    pub scroll_cost: u64,
    pub soldier_cost: u64,
    pub donation_required: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_shape() {
        let response = ActionResponse::failure("Not enough gold!");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({"success": false, "message": "Not enough gold!"}));
    }

    #[test]
    fn test_flattened_data() {
        let response = ActionResponse::ok_with(
            "Joined Sparta!",
            ResponseData::Country {
                advantage: "Strength",
                weakness: "Stamina Issues",
            },
        );
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "message": "Joined Sparta!",
                "advantage": "Strength",
                "weakness": "Stamina Issues"
            })
        );
    }

    #[test]
    fn test_empty_message_omitted() {
        let value = serde_json::to_value(ActionResponse::ok("")).unwrap();
        assert_eq!(value, json!({"success": true}));
    }
}
