//! Entity model: static table descriptions plus the typed records read back from them.
//!
//! DDL, SQL building, input parsing and delete rules are all driven from [`EntityDef`].

mod offer;
mod order;
mod user;

pub use offer::{Offer, OFFERS};
pub use order::{Order, ORDERS};
pub use user::{User, USERS};

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;
use std::fmt;

/// Name of the integer primary key column shared by every table.
pub const PK_COLUMN: &str = "id";

/// How a request value is parsed and stored.
pub enum FieldKind {
    Text,
    Integer,
    /// Calendar date; `MM/DD/YYYY` on input, ISO `YYYY-MM-DD` in storage.
    Date,
    /// Integer id of a row in another table.
    Reference(&'static EntityDef),
}

// Manual impls: the entity graph is cyclic (users -> orders -> users), so only table names are printed.
impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => f.write_str("Text"),
            FieldKind::Integer => f.write_str("Integer"),
            FieldKind::Date => f.write_str("Date"),
            FieldKind::Reference(target) => write!(f, "Reference({})", target.table),
        }
    }
}

impl FieldKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Integer | FieldKind::Reference(_) => "INTEGER",
            FieldKind::Date => "DATE",
        }
    }
}

#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// What happens to dependent rows when their parent row is deleted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnDelete {
    /// Delete the dependent rows (and, recursively, their own dependents).
    Delete,
    /// Leave the dependent rows and their reference as they are. The column carries
    /// no enforced foreign key, so the reference may outlive the deleted row.
    Keep,
}

/// A column in another table that references this entity's primary key.
pub struct Dependent {
    pub entity: &'static EntityDef,
    pub column: &'static str,
    pub rule: OnDelete,
}

impl fmt::Debug for Dependent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependent")
            .field("table", &self.entity.table)
            .field("column", &self.column)
            .field("rule", &self.rule)
            .finish()
    }
}

#[derive(Debug)]
pub struct EntityDef {
    pub table: &'static str,
    /// Used in confirmation messages ("Updated user 3 success").
    pub singular: &'static str,
    /// URL path segment of the collection.
    pub path: &'static str,
    /// Every column except the primary key, in output order.
    pub columns: &'static [ColumnDef],
    /// Applied in order, before the row itself is deleted.
    pub dependents: &'static [Dependent],
}

impl EntityDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Rule for `table.column` when a row of this entity is deleted.
    pub fn rule_for(&self, table: &str, column: &str) -> Option<OnDelete> {
        self.dependents
            .iter()
            .find(|d| d.entity.table == table && d.column == column)
            .map(|d| d.rule)
    }

    /// Columns that reference another table, with the referenced entity.
    pub fn references(&self) -> impl Iterator<Item = (&'static ColumnDef, &'static EntityDef)> {
        let columns: &'static [ColumnDef] = self.columns;
        columns.iter().filter_map(|c| match c.kind {
            FieldKind::Reference(target) => Some((c, target)),
            _ => None,
        })
    }
}

/// Tables in creation order: referenced tables come before the tables that reference them.
pub static ENTITIES: [&EntityDef; 3] = [&USERS, &ORDERS, &OFFERS];

/// A record type stored in one table described by an [`EntityDef`].
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Serialize + Send + Sync + Unpin + 'static {
    fn def() -> &'static EntityDef;
}
