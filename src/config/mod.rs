/// Database configuration and connection management
pub mod database;

/// Store and loyalty settings loaded from config.toml
pub mod store;

/// Staff allowlist from environment variables
pub mod users;
