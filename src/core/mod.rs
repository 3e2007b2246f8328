//! Core business logic, independent of Discord.
//!
//! Every operation takes a database handle and plain values and returns structured
//! results. The bot layer only parses input and formats output.

/// Client registry: lookup, registration, code generation and balance writes
pub mod client;
/// Points and bonus arithmetic
pub mod loyalty;
/// Multiplier campaigns and their validity window
pub mod promotion;
/// Purchase flow
pub mod purchase;
/// Dashboard aggregates, daily withdrawal report and shared formatting
pub mod report;
/// Append-only ledger of purchases and withdrawals
pub mod transaction;
/// Bonus withdrawal flow and printable receipt
pub mod withdrawal;
