//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from an entity definition.

use crate::model::{EntityDef, OnDelete, PK_COLUMN};
use crate::sql::SqlValue;

/// Quote identifier for SQLite (safe: only from static entity definitions).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlValue) {
        self.params.push(v);
    }
}

/// Primary key followed by every column, in output order.
fn select_column_list(entity: &EntityDef) -> String {
    std::iter::once(PK_COLUMN)
        .chain(entity.columns.iter().map(|c| c.name))
        .map(quoted)
        .collect::<Vec<_>>()
        .join(", ")
}

/// All rows ordered by primary key.
pub fn select_list(entity: &EntityDef) -> String {
    format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(entity),
        quoted(entity.table),
        quoted(PK_COLUMN)
    )
}

/// One row by primary key; binds the id.
pub fn select_by_id(entity: &EntityDef) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?",
        select_column_list(entity),
        quoted(entity.table),
        quoted(PK_COLUMN)
    )
}

/// Existence probe by primary key; binds the id.
pub fn exists_by_id(entity: &EntityDef) -> String {
    format!(
        "SELECT 1 FROM {} WHERE {} = ?",
        quoted(entity.table),
        quoted(PK_COLUMN)
    )
}

/// Smallest id not in the table that is at least the requested one; binds the
/// requested id twice. NULL when every id from the requested one up to `i64::MAX`
/// is taken. Successors of `i64::MAX` are excluded so the sum stays an integer.
pub fn next_free_id(entity: &EntityDef) -> String {
    let table = quoted(entity.table);
    let pk = quoted(PK_COLUMN);
    let max = i64::MAX;
    format!(
        "SELECT MIN(candidate) FROM (\
         SELECT ? AS candidate \
         UNION SELECT {pk} + 1 FROM {table} WHERE {pk} >= ? AND {pk} < {max}\
         ) WHERE candidate NOT IN (SELECT {pk} FROM {table})"
    )
}

/// Current maximum id, NULL for an empty table. The caller adds one.
pub fn next_auto_id(entity: &EntityDef) -> String {
    format!(
        "SELECT MAX({pk}) FROM {}",
        quoted(entity.table),
        pk = quoted(PK_COLUMN)
    )
}

/// INSERT with an explicit id and the given column values.
pub fn insert(entity: &EntityDef, id: i64, values: &[(&str, SqlValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = vec![quoted(PK_COLUMN)];
    q.push_param(SqlValue::I64(id));
    for (name, value) in values {
        cols.push(quoted(name));
        q.push_param(value.clone());
    }
    let placeholders = vec!["?"; cols.len()].join(", ");
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(entity.table),
        cols.join(", "),
        placeholders
    );
    q
}

/// UPDATE the given columns of one row. Caller must pass at least one value.
pub fn update(entity: &EntityDef, id: i64, values: &[(&str, SqlValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let sets: Vec<String> = values
        .iter()
        .map(|(name, value)| {
            q.push_param(value.clone());
            format!("{} = ?", quoted(name))
        })
        .collect();
    q.push_param(SqlValue::I64(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quoted(entity.table),
        sets.join(", "),
        quoted(PK_COLUMN)
    );
    q
}

/// DELETE one row by primary key; binds the id.
pub fn delete(entity: &EntityDef) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?",
        quoted(entity.table),
        quoted(PK_COLUMN)
    )
}

/// Statements applying the dependent-row rules for deleting one row of `entity`.
/// Run them in order, before [`delete`]. Each statement binds the deleted id exactly once.
pub fn dependent_rules(entity: &EntityDef) -> Vec<String> {
    let mut out = Vec::new();
    push_dependent_rules(entity, "?", &mut out);
    out
}

/// `scope` is a SQL expression yielding the ids of the `entity` rows being deleted.
fn push_dependent_rules(entity: &EntityDef, scope: &str, out: &mut Vec<String>) {
    for dep in entity.dependents {
        let table = quoted(dep.entity.table);
        let column = quoted(dep.column);
        match dep.rule {
            OnDelete::Delete => {
                let child_scope = format!(
                    "SELECT {} FROM {} WHERE {} IN ({})",
                    quoted(PK_COLUMN),
                    table,
                    column,
                    scope
                );
                push_dependent_rules(dep.entity, &child_scope, out);
                out.push(format!("DELETE FROM {} WHERE {} IN ({})", table, column, scope));
            }
            OnDelete::Keep => {}
        }
    }
}
