//! Error types for the warfare core engine

use std::fmt;
use thiserror::Error;

/// Catalog list a selection was checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Country,
    Armor,
}

impl fmt::Display for SelectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKind::Country => write!(f, "country"),
            SelectionKind::Armor => write!(f, "armor"),
        }
    }
}

/// Main error type for the warfare core engine
#[derive(Error, Debug)]
pub enum WarfareError {
    #[error("Insufficient funds: need {cost}, have {available}")]
    InsufficientFunds { cost: u64, available: u64 },

    #[error("Invalid {kind}: {value}")]
    InvalidSelection { kind: SelectionKind, value: String },

    #[error("Income cooldown active: {remaining} seconds remaining")]
    CooldownActive { remaining: i64 },

    #[error("No soldiers available for the battlefield")]
    NoSoldiers,

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Age not found: {0}")]
    AgeNotFound(u32),

    #[error("Corrupt player record: {0}")]
    CorruptRecord(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WarfareError {
    /// Shorthand for a `Validation` error
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        WarfareError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this is a recoverable gameplay failure (as opposed to an
    /// infrastructure failure)
    pub fn is_gameplay(&self) -> bool {
        matches!(
            self,
            WarfareError::InsufficientFunds { .. }
                | WarfareError::InvalidSelection { .. }
                | WarfareError::CooldownActive { .. }
                | WarfareError::NoSoldiers
                | WarfareError::Validation { .. }
        )
    }

    /// Message shown to the player for a failed action
    pub fn user_message(&self) -> String {
        match self {
            WarfareError::InsufficientFunds { .. } => "Not enough gold!".to_string(),
            WarfareError::InvalidSelection { kind, .. } => match kind {
                SelectionKind::Country => "Invalid country!".to_string(),
                SelectionKind::Armor => "Invalid armor!".to_string(),
            },
            WarfareError::CooldownActive { remaining } => format!("Wait {} seconds!", remaining),
            WarfareError::NoSoldiers => {
                "You need soldiers to enter the battlefield!".to_string()
            }
            WarfareError::Validation { field, reason } => format!("Invalid {}: {}", field, reason),
            _ => "Something went wrong, please try again.".to_string(),
        }
    }
}

#[cfg(feature = "python")]
impl From<WarfareError> for pyo3::PyErr {
    fn from(err: WarfareError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};

        match err {
            WarfareError::Validation { .. } | WarfareError::InvalidSelection { .. } => {
                PyValueError::new_err(err.to_string())
            }
            WarfareError::AgeNotFound(index) => {
                PyKeyError::new_err(format!("Age not found: {}", index))
            }
            other => PyRuntimeError::new_err(other.to_string()),
        }
    }
}

/// Result type alias for the warfare core engine
pub type Result<T> = std::result::Result<T, WarfareError>;
