//! Unified error type for Pontos+.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants are grouped
//! loosely into lookup failures, validation failures raised before anything is
//! written, storage failures, and the ambient plumbing (config, I/O, Discord).

use poise::serenity_prelude as serenity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Client not found: {identifier}")]
    ClientNotFound { identifier: String },

    #[error("Promotion not found: {name}")]
    PromotionNotFound { name: String },

    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    #[error("Invalid multiplier: {multiplier} (must be at least 1)")]
    InvalidMultiplier { multiplier: i32 },

    #[error("Invalid CPF '{cpf}': expected 11 digits")]
    InvalidCpf { cpf: String },

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("Invalid promotion window: start {start} is after end {end}")]
    InvalidPromotionWindow { start: String, end: String },

    #[error("{message}")]
    Validation { message: String },

    #[error("Insufficient bonus: client has R$ {available:.2}, requested R$ {requested:.2}")]
    InsufficientBonus { available: f64, requested: f64 },

    #[error("A client with CPF {cpf} is already registered")]
    DuplicateCpf { cpf: String },

    #[error("No free client code left after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    #[error("Balance of client {client_id} changed while the operation was running; try again")]
    ConcurrentUpdate { client_id: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<serenity::Error>),
}

impl From<serenity::Error> for Error {
    fn from(value: serenity::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether this error is an expected, user-facing rejection rather than
    /// an infrastructure failure. The bot replies to these without logging
    /// them at error level.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::ClientNotFound { .. }
                | Self::PromotionNotFound { .. }
                | Self::InvalidAmount { .. }
                | Self::InvalidMultiplier { .. }
                | Self::InvalidCpf { .. }
                | Self::InvalidDate { .. }
                | Self::InvalidPromotionWindow { .. }
                | Self::Validation { .. }
                | Self::InsufficientBonus { .. }
                | Self::DuplicateCpf { .. }
                | Self::ConcurrentUpdate { .. }
        )
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
