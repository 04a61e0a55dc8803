//! Apply the entity model to the database: CREATE TABLE, then indexes.
//! Tables are created in [`ENTITIES`] order so referenced tables exist first.

use crate::model::{EntityDef, FieldKind, OnDelete, ENTITIES, PK_COLUMN};
use crate::sql::quoted;
use sqlx::SqlitePool;

/// CREATE TABLE for one entity. Only references whose rows are deleted along with
/// their target get an enforced foreign key, with no ON DELETE action; the service
/// deletes those rows before the parent. Kept references are plain integer columns.
pub fn create_table(entity: &EntityDef) -> String {
    let mut col_defs = vec![format!("{} INTEGER PRIMARY KEY NOT NULL", quoted(PK_COLUMN))];
    for c in entity.columns {
        col_defs.push(format!("{} {}", quoted(c.name), c.kind.sql_type()));
    }
    for c in entity.columns {
        let FieldKind::Reference(target) = c.kind else {
            continue;
        };
        if target.rule_for(entity.table, c.name) == Some(OnDelete::Delete) {
            col_defs.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                quoted(c.name),
                quoted(target.table),
                quoted(PK_COLUMN)
            ));
        }
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        quoted(entity.table),
        col_defs.join(",\n    ")
    )
}

/// One index per reference column; dependent-row rules look rows up by these.
pub fn create_indexes(entity: &EntityDef) -> Vec<String> {
    entity
        .references()
        .map(|(c, _)| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quoted(&format!("{}_{}_idx", entity.table, c.name)),
                quoted(entity.table),
                quoted(c.name)
            )
        })
        .collect()
}

/// Create every table and index. Idempotent.
pub async fn apply_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for entity in ENTITIES {
        let ddl = create_table(entity);
        tracing::debug!(sql = %ddl, "migration");
        sqlx::query(&ddl).execute(pool).await?;
        for idx in create_indexes(entity) {
            tracing::debug!(sql = %idx, "migration");
            sqlx::query(&idx).execute(pool).await?;
        }
    }
    tracing::info!(tables = ENTITIES.len(), "schema ready");
    Ok(())
}
