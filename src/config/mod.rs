//! Configuration module for static game data and tuning
//!
//! The age ladder and soldier profiles are read-only tables built once on
//! first use. Numeric tuning lives in [`GameRules`], which can be loaded
//! from a partial JSON document.

mod age;
mod rules;
mod soldier;

pub use age::*;
pub use rules::*;
pub use soldier::*;
