//! Player-facing game surface
//!
//! Decodes raw actions, runs them against a stored record under the
//! player's lock, and shapes the result for the client.

mod action;
pub mod input;
mod response;
mod service;

pub use action::*;
pub use response::*;
pub use service::*;
