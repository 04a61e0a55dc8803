//! Startup seed: populate users, orders and offers from a JSON fixture.
//!
//! The file is one object with `users`, `orders` and `offers` arrays. Records keep
//! their ids, dates are `MM/DD/YYYY`, and everything is inserted in one transaction.

use crate::error::{AppError, SeedError};
use crate::model::{EntityDef, OFFERS, ORDERS, USERS};
use crate::service::{check_references, insert_row, FieldParser};
use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;

type Record = Map<String, Value>;

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<Record>,
    #[serde(default)]
    pub orders: Vec<Record>,
    #[serde(default)]
    pub offers: Vec<Record>,
}

/// Rows inserted per table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub users: usize,
    pub orders: usize,
    pub offers: usize,
}

pub async fn load_seed_file(pool: &SqlitePool, path: &Path) -> Result<SeedCounts, SeedError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let counts = load_seed_str(pool, &text).await?;
    tracing::info!(
        path = %path.display(),
        users = counts.users,
        orders = counts.orders,
        offers = counts.offers,
        "seed loaded"
    );
    Ok(counts)
}

pub async fn load_seed_str(pool: &SqlitePool, text: &str) -> Result<SeedCounts, SeedError> {
    let seed: SeedFile = serde_json::from_str(text)?;
    load_seed(pool, &seed).await
}

/// Insert every record, users first so orders and offers can reference them.
/// Any bad record aborts the whole load.
pub async fn load_seed(pool: &SqlitePool, seed: &SeedFile) -> Result<SeedCounts, SeedError> {
    let mut tx = pool.begin().await?;
    let counts = SeedCounts {
        users: insert_records(&mut tx, &USERS, &seed.users).await?,
        orders: insert_records(&mut tx, &ORDERS, &seed.orders).await?,
        offers: insert_records(&mut tx, &OFFERS, &seed.offers).await?,
    };
    tx.commit().await?;
    Ok(counts)
}

async fn insert_records(
    conn: &mut SqliteConnection,
    entity: &'static EntityDef,
    records: &[Record],
) -> Result<usize, SeedError> {
    let invalid = |index: usize, message: String| SeedError::InvalidRecord {
        entity: entity.table,
        index,
        message,
    };
    for (index, record) in records.iter().enumerate() {
        let id = FieldParser::parse_id(record)
            .map_err(|reason| invalid(index, format!("id: {}", reason)))?
            .ok_or_else(|| invalid(index, "missing id".into()))?;
        let values = FieldParser::parse(entity, record).map_err(|errors| invalid(index, errors.describe()))?;
        check_references(conn, entity, &values).await.map_err(|e| match e {
            AppError::Validation(errors) => invalid(index, errors.describe()),
            AppError::Db(db) => SeedError::Db(db),
            other => invalid(index, other.to_string()),
        })?;
        insert_row(conn, entity, id, &values).await.map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
                invalid(index, format!("id {}: {}", id, db.message()))
            }
            other => SeedError::Db(other),
        })?;
    }
    Ok(records.len())
}
