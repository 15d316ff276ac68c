//! Persistence gateway and per-player locking

mod gateway;
mod locks;

pub use gateway::*;
pub use locks::*;
