//! Shared test utilities for Pontos+.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test clients with sensible defaults.

use crate::{core::client, entities, errors::Result};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test client with sensible defaults.
///
/// # Defaults
/// * `name`: "Test Client"
/// * `phone`: "84999991234"
pub async fn create_test_client(
    db: &DatabaseConnection,
    cpf: &str,
) -> Result<entities::client::Model> {
    create_custom_client(db, "Test Client", cpf).await
}

/// Creates a test client with a custom name.
pub async fn create_custom_client(
    db: &DatabaseConnection,
    name: &str,
    cpf: &str,
) -> Result<entities::client::Model> {
    client::create_client(db, name.to_string(), cpf, "84999991234".to_string()).await
}

/// Sets up a complete test environment with one client.
/// Returns (db, client) for common test scenarios.
pub async fn setup_with_client() -> Result<(DatabaseConnection, entities::client::Model)> {
    let db = setup_test_db().await?;
    let client = create_test_client(&db, "12345678901").await?;
    Ok((db, client))
}
