//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions that are not commands
//! themselves: autocomplete and the staff check run before every command.

/// Staff allowlist check
pub mod auth;
/// Autocomplete handlers for promotion names
pub mod autocomplete;
