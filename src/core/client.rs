//! Client business logic - The loyalty customer directory.
//!
//! Clients are looked up by whatever staff type at the counter: four digits are a
//! store code, anything else is treated as a CPF. Punctuation is stripped first so
//! `123.456.789-01` and `12345678901` resolve to the same client.

use crate::{
    entities::{Client, client},
    errors::{Error, Result},
};
use chrono::Utc;
use rand::Rng;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::{debug, info, instrument};

/// Length of a store-assigned client code
pub const CODE_LENGTH: usize = 4;

/// Length of a CPF once punctuation is removed
pub const CPF_LENGTH: usize = 11;

const MAX_CODE_ATTEMPTS: u32 = 50;

/// How a typed identifier is matched against the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientLookup {
    /// Exactly four digits: match the `code` column
    Code(String),
    /// Anything else: match the `cpf` column
    Cpf(String),
}

impl ClientLookup {
    /// Classifies raw staff input after stripping everything but digits.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let cleaned = clean_identifier(input);
        if cleaned.len() == CODE_LENGTH {
            Self::Code(cleaned)
        } else {
            Self::Cpf(cleaned)
        }
    }
}

/// Keeps ASCII digits only.
#[must_use]
pub fn clean_identifier(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Formats an 11-digit CPF as `123.456.789-01`; other inputs are returned unchanged.
#[must_use]
pub fn format_cpf(cpf: &str) -> String {
    let digits = clean_identifier(cpf);
    if digits.len() != CPF_LENGTH {
        return cpf.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..9],
        &digits[9..11]
    )
}

/// Formats Brazilian phone numbers: 11 digits as `(84) 99999-1234`,
/// 10 digits as `(84) 3333-1234`. Other inputs are returned unchanged.
#[must_use]
pub fn format_phone(phone: &str) -> String {
    let digits = clean_identifier(phone);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[0..2], &digits[2..7], &digits[7..11]),
        10 => format!("({}) {}-{}", &digits[0..2], &digits[2..6], &digits[6..10]),
        _ => phone.to_string(),
    }
}

/// Finds the client matching a typed CPF or code.
///
/// Returns `None` when nothing matches. Uniqueness of both columns is enforced by
/// the schema, so at most one row can match.
pub async fn find_client<C>(db: &C, input: &str) -> Result<Option<client::Model>>
where
    C: ConnectionTrait,
{
    let query = match ClientLookup::parse(input) {
        ClientLookup::Code(code) => Client::find().filter(client::Column::Code.eq(code)),
        ClientLookup::Cpf(cpf) => Client::find().filter(client::Column::Cpf.eq(cpf)),
    };
    query.one(db).await.map_err(Into::into)
}

/// Like [`find_client`] but turns a miss into `Error::ClientNotFound`.
pub async fn require_client<C>(db: &C, input: &str) -> Result<client::Model>
where
    C: ConnectionTrait,
{
    find_client(db, input)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            identifier: input.trim().to_string(),
        })
}

/// Finds a client by its unique ID.
pub async fn get_client_by_id<C>(db: &C, client_id: i64) -> Result<Option<client::Model>>
where
    C: ConnectionTrait,
{
    Client::find_by_id(client_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists clients ordered by points (highest first).
///
/// With a search term, keeps clients whose name contains it (case-insensitive) or
/// whose CPF or code contains it.
pub async fn list_clients(
    db: &DatabaseConnection,
    search: Option<&str>,
) -> Result<Vec<client::Model>> {
    let clients = Client::find()
        .order_by_desc(client::Column::Points)
        .order_by_asc(client::Column::Name)
        .all(db)
        .await?;

    let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) else {
        return Ok(clients);
    };
    let term_lower = term.to_lowercase();

    Ok(clients
        .into_iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&term_lower)
                || c.cpf.contains(term)
                || c.code.contains(term)
        })
        .collect())
}

fn random_code() -> String {
    let value: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("{value:04}")
}

/// Generates a 4-digit code not used by any existing client.
///
/// # Errors
/// Returns `Error::CodeSpaceExhausted` if no free code is found after a bounded
/// number of random draws.
pub async fn generate_unique_code<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let candidate = random_code();
        let taken = Client::find()
            .filter(client::Column::Code.eq(candidate.as_str()))
            .count(db)
            .await?
            > 0;
        if !taken {
            debug!(attempt, "Generated client code");
            return Ok(candidate);
        }
    }
    Err(Error::CodeSpaceExhausted {
        attempts: MAX_CODE_ATTEMPTS,
    })
}

/// Registers a new client with zero points and bonus and a freshly generated code.
///
/// # Errors
/// Returns an error if:
/// - The name or phone is empty or whitespace-only
/// - The CPF does not have 11 digits after cleaning
/// - A client with the same CPF already exists
/// - No free code could be generated or the insert fails
#[instrument(skip_all)]
pub async fn create_client<C>(
    db: &C,
    name: String,
    cpf: &str,
    phone: String,
) -> Result<client::Model>
where
    C: ConnectionTrait,
{
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Client name cannot be empty".to_string(),
        });
    }
    if phone.trim().is_empty() {
        return Err(Error::Validation {
            message: "Client phone cannot be empty".to_string(),
        });
    }

    let clean_cpf = clean_identifier(cpf);
    if clean_cpf.len() != CPF_LENGTH {
        return Err(Error::InvalidCpf {
            cpf: cpf.to_string(),
        });
    }

    let duplicate = Client::find()
        .filter(client::Column::Cpf.eq(clean_cpf.as_str()))
        .count(db)
        .await?
        > 0;
    if duplicate {
        return Err(Error::DuplicateCpf { cpf: clean_cpf });
    }

    let code = generate_unique_code(db).await?;

    let client = client::ActiveModel {
        name: Set(name.trim().to_string()),
        cpf: Set(clean_cpf),
        code: Set(code),
        phone: Set(phone.trim().to_string()),
        points: Set(0),
        bonus: Set(0.0),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = client.insert(db).await?;
    info!(client_id = result.id, code = %result.code, "Client registered");
    Ok(result)
}

/// Sets a client's points and bonus to absolute values.
///
/// The write only lands if the row still holds the balances in `current`. This turns
/// a concurrent read-modify-write on the same client into `Error::ConcurrentUpdate`
/// instead of a silently lost update.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `current` - The client as it was read before computing the new balances
/// * `points` - New absolute points
/// * `bonus` - New absolute bonus in reais
pub async fn update_balances<C>(
    db: &C,
    current: &client::Model,
    points: i64,
    bonus: f64,
) -> Result<client::Model>
where
    C: ConnectionTrait,
{
    let result = Client::update_many()
        .col_expr(client::Column::Points, Expr::value(points))
        .col_expr(client::Column::Bonus, Expr::value(bonus))
        .filter(client::Column::Id.eq(current.id))
        .filter(client::Column::Points.eq(current.points))
        .filter(client::Column::Bonus.eq(current.bonus))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ConcurrentUpdate {
            client_id: current.id,
        });
    }

    Ok(client::Model {
        points,
        bonus,
        ..current.clone()
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_lookup_four_digits_is_code() {
        assert_eq!(
            ClientLookup::parse("1234"),
            ClientLookup::Code("1234".to_string())
        );
        assert_eq!(
            ClientLookup::parse(" 0042 "),
            ClientLookup::Code("0042".to_string())
        );
    }

    #[test]
    fn test_lookup_other_lengths_are_cpf() {
        assert_eq!(
            ClientLookup::parse("12345678901"),
            ClientLookup::Cpf("12345678901".to_string())
        );
        assert_eq!(
            ClientLookup::parse("123.456.789-01"),
            ClientLookup::Cpf("12345678901".to_string())
        );
        assert_eq!(
            ClientLookup::parse("123"),
            ClientLookup::Cpf("123".to_string())
        );
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
        assert_eq!(format_cpf("123"), "123");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("84999991234"), "(84) 99999-1234");
        assert_eq!(format_phone("8433331234"), "(84) 3333-1234");
        assert_eq!(format_phone("+1 555"), "+1 555");
    }

    #[test]
    fn test_random_code_is_four_digits() {
        for _ in 0..100 {
            let code = random_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_create_client_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_client(&db, " ".to_string(), "12345678901", "849".to_string()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_client(&db, "Ana".to_string(), "12345678901", String::new()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_client(&db, "Ana".to_string(), "123.456", "849".to_string()).await;
        assert!(matches!(result, Err(Error::InvalidCpf { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_client_assigns_code_and_zero_balances() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_client(
            &db,
            " Maria Silva ".to_string(),
            "123.456.789-01",
            "84 99999-1234".to_string(),
        )
        .await?;

        assert_eq!(created.name, "Maria Silva");
        assert_eq!(created.cpf, "12345678901");
        assert_eq!(created.code.len(), CODE_LENGTH);
        assert_eq!(created.points, 0);
        assert_eq!(created.bonus, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_client_rejects_duplicate_cpf() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_client(&db, "12345678901").await?;

        let result = create_client(
            &db,
            "Outra".to_string(),
            "123.456.789-01",
            "849".to_string(),
        )
        .await;
        assert!(matches!(result, Err(Error::DuplicateCpf { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_find_client_by_code_and_cpf() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_client(&db, "12345678901").await?;

        let by_code = find_client(&db, &created.code).await?.unwrap();
        assert_eq!(by_code.id, created.id);

        let by_cpf = find_client(&db, "123.456.789-01").await?.unwrap();
        assert_eq!(by_cpf.id, created.id);

        assert!(find_client(&db, "98765432100").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_require_client_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = require_client(&db, "9999").await;
        assert!(matches!(result, Err(Error::ClientNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_generated_codes_are_unique() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_test_client(&db, "11111111111").await?;
        let second = create_test_client(&db, "22222222222").await?;
        assert_ne!(first.code, second.code);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_balances_sets_absolute_values() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_client(&db, "12345678901").await?;

        let updated = update_balances(&db, &created, 530, 10.0).await?;
        assert_eq!(updated.points, 530);
        assert_eq!(updated.bonus, 10.0);

        let stored = get_client_by_id(&db, created.id).await?.unwrap();
        assert_eq!(stored, updated);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_balances_detects_stale_read() -> Result<()> {
        let db = setup_test_db().await?;
        let stale = create_test_client(&db, "12345678901").await?;

        // Another writer lands first
        update_balances(&db, &stale, 120, 0.0).await?;

        let result = update_balances(&db, &stale, 50, 0.0).await;
        assert!(matches!(result, Err(Error::ConcurrentUpdate { .. })));

        let stored = get_client_by_id(&db, stale.id).await?.unwrap();
        assert_eq!(stored.points, 120);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_clients_orders_and_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let low = create_custom_client(&db, "Ana Souza", "11111111111").await?;
        let high = create_custom_client(&db, "Bruno Lima", "22222222222").await?;
        update_balances(&db, &high, 900, 10.0).await?;
        update_balances(&db, &low, 100, 0.0).await?;

        let all = list_clients(&db, None).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Bruno Lima");

        let by_name = list_clients(&db, Some("ana")).await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, low.id);

        let by_cpf = list_clients(&db, Some("2222")).await?;
        assert!(by_cpf.iter().any(|c| c.id == high.id));

        let blank = list_clients(&db, Some("  ")).await?;
        assert_eq!(blank.len(), 2);
        Ok(())
    }
}
