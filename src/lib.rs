//! Warfare Core - Age-of-warfare progression game engine
//!
//! Players grow an army through eight ages of history: buying scrolls,
//! recruiting soldiers, donating gold to advance, fighting battles and
//! surviving battlefield encounters. Player records live behind a
//! [`PersistenceGateway`](store::PersistenceGateway); the
//! [`GameService`](game::GameService) applies one action per request.
//!
//! Python bindings are available with the `python` feature.

pub mod battle;
pub mod battlefield;
pub mod config;
pub mod economy;
pub mod error;
pub mod game;
pub mod player;
pub mod rng;
pub mod store;

#[cfg(feature = "python")]
mod python;

pub use error::{Result, WarfareError};
pub use game::{Action, ActionResponse, GameService, PlayerView};
pub use player::PlayerRecord;
pub use store::{MemoryGateway, PersistenceGateway};
