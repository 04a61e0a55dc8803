//! Generic CRUD execution against SQLite.

use crate::error::{AppError, FieldErrors};
use crate::model::{Entity, EntityDef};
use crate::service::validation::{FieldParser, ParsedFields};
use crate::sql::{self, QueryBuf};
use serde_json::{Map, Value};
use sqlx::{SqliteConnection, SqlitePool};

pub struct CrudService;

impl CrudService {
    /// All rows ordered by id.
    pub async fn list<E: Entity>(pool: &SqlitePool) -> Result<Vec<E>, AppError> {
        let sql = sql::select_list(E::def());
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(pool).await?;
        Ok(rows)
    }

    /// Fetch one row by primary key.
    pub async fn read<E: Entity>(pool: &SqlitePool, id: i64) -> Result<Option<E>, AppError> {
        let sql = sql::select_by_id(E::def());
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Insert one row from a request body and return its id.
    ///
    /// A requested id that is taken is moved to the next free id above it; no id
    /// means the next auto-increment id. Bad values and dangling references are
    /// reported together and nothing is written.
    pub async fn create(
        pool: &SqlitePool,
        entity: &EntityDef,
        body: &Map<String, Value>,
    ) -> Result<i64, AppError> {
        let mut errors = FieldErrors::new();
        let requested = match FieldParser::parse_id(body) {
            Ok(id) => id,
            Err(reason) => {
                errors.push("id", reason);
                None
            }
        };
        let values = match FieldParser::parse(entity, body) {
            Ok(values) => values,
            Err(field_errors) => {
                errors.merge(field_errors);
                Vec::new()
            }
        };
        errors.into_result()?;

        let mut tx = pool.begin().await?;
        check_references(&mut tx, entity, &values).await?;
        let id = match requested {
            Some(requested) => next_free_id(&mut tx, entity, requested).await?,
            None => next_auto_id(&mut tx, entity).await?,
        };
        insert_row(&mut tx, entity, id, &values).await?;
        tx.commit().await?;
        if requested.is_some_and(|r| r != id) {
            tracing::info!(table = entity.table, requested = ?requested, id, "requested id taken; assigned next free id");
        }
        tracing::info!(table = entity.table, id, "created");
        Ok(id)
    }

    /// Apply the known fields of `body` to one row. Returns false if the row does not exist.
    /// Unknown keys are ignored; any bad value rejects the whole update.
    pub async fn update(
        pool: &SqlitePool,
        entity: &EntityDef,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<bool, AppError> {
        let mut tx = pool.begin().await?;
        if !exists(&mut tx, entity, id).await? {
            return Ok(false);
        }
        let values = FieldParser::parse(entity, body).map_err(AppError::Validation)?;
        if values.is_empty() {
            tracing::debug!(table = entity.table, id, "update with no known fields");
            return Ok(true);
        }
        check_references(&mut tx, entity, &values).await?;
        let q = sql::update(entity, id, &values);
        execute(&mut tx, &q).await?;
        tx.commit().await?;
        let fields: Vec<&str> = values.iter().map(|(name, _)| *name).collect();
        tracing::info!(table = entity.table, id, fields = ?fields, "updated");
        Ok(true)
    }

    /// Delete one row after applying its dependent-row rules. Returns false if the row does not exist.
    pub async fn delete(pool: &SqlitePool, entity: &EntityDef, id: i64) -> Result<bool, AppError> {
        let mut tx = pool.begin().await?;
        if !exists(&mut tx, entity, id).await? {
            return Ok(false);
        }
        for rule in sql::dependent_rules(entity) {
            tracing::debug!(sql = %rule, id, "query (tx)");
            let affected = sqlx::query(&rule).bind(id).execute(&mut *tx).await?.rows_affected();
            if affected > 0 {
                tracing::debug!(table = entity.table, id, affected, rule = %rule, "dependent rows changed");
            }
        }
        let sql = sql::delete(entity);
        tracing::debug!(sql = %sql, id, "query (tx)");
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;
        tracing::info!(table = entity.table, id, "deleted");
        Ok(true)
    }
}

/// Insert with an exact id. Shared by create and the seed loader.
pub(crate) async fn insert_row(
    conn: &mut SqliteConnection,
    entity: &EntityDef,
    id: i64,
    values: &ParsedFields,
) -> Result<(), sqlx::Error> {
    let q = sql::insert(entity, id, values);
    execute(conn, &q).await
}

async fn execute(conn: &mut SqliteConnection, q: &QueryBuf) -> Result<(), sqlx::Error> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query (tx)");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query.execute(&mut *conn).await?;
    Ok(())
}

async fn exists(conn: &mut SqliteConnection, entity: &EntityDef, id: i64) -> Result<bool, sqlx::Error> {
    let sql = sql::exists_by_id(entity);
    tracing::debug!(sql = %sql, id, "query (tx)");
    let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
    Ok(row.is_some())
}

/// Every non-null reference value must name an existing row.
pub(crate) async fn check_references(
    conn: &mut SqliteConnection,
    entity: &EntityDef,
    values: &ParsedFields,
) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    for (col, target) in entity.references() {
        let Some(id) = values
            .iter()
            .find(|(name, _)| *name == col.name)
            .and_then(|(_, v)| v.as_i64())
        else {
            continue;
        };
        if !exists(conn, target, id).await? {
            errors.push(col.name, format!("no {} with id {}", target.singular, id));
        }
    }
    errors.into_result()
}

async fn next_free_id(
    conn: &mut SqliteConnection,
    entity: &EntityDef,
    requested: i64,
) -> Result<i64, AppError> {
    let sql = sql::next_free_id(entity);
    tracing::debug!(sql = %sql, requested, "query (tx)");
    let id: Option<i64> = sqlx::query_scalar(&sql)
        .bind(requested)
        .bind(requested)
        .fetch_one(&mut *conn)
        .await?;
    id.ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.push("id", format!("no free id at or above {}", requested));
        AppError::Validation(errors)
    })
}

/// One past the current maximum, 1 for an empty table. Once the maximum is
/// `i64::MAX`, the lowest free id is used instead.
async fn next_auto_id(conn: &mut SqliteConnection, entity: &EntityDef) -> Result<i64, AppError> {
    let sql = sql::next_auto_id(entity);
    tracing::debug!(sql = %sql, "query (tx)");
    let max: Option<i64> = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
    match max {
        None => Ok(1),
        Some(max) => match max.checked_add(1) {
            Some(id) => Ok(id),
            None => next_free_id(conn, entity, 1).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::apply_migrations;
    use crate::model::{Offer, Order, User, OFFERS, ORDERS, USERS};
    use crate::store::connect;
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    async fn pool() -> SqlitePool {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        apply_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn taken_id_moves_to_next_free() {
        let pool = pool().await;
        for id in [1, 2, 4] {
            CrudService::create(&pool, &USERS, &object(json!({"id": id}))).await.unwrap();
        }
        let id = CrudService::create(&pool, &USERS, &object(json!({"id": "1", "first_name": "Ann"})))
            .await
            .unwrap();
        assert_eq!(id, 3);
        let user: User = CrudService::read(&pool, 3).await.unwrap().unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Ann"));
    }

    #[tokio::test]
    async fn missing_id_auto_increments() {
        let pool = pool().await;
        assert_eq!(CrudService::create(&pool, &USERS, &Map::new()).await.unwrap(), 1);
        CrudService::create(&pool, &USERS, &object(json!({"id": 10}))).await.unwrap();
        assert_eq!(CrudService::create(&pool, &USERS, &Map::new()).await.unwrap(), 11);
    }

    #[tokio::test]
    async fn ids_near_the_integer_limit() {
        let pool = pool().await;
        let top = CrudService::create(&pool, &USERS, &object(json!({"id": i64::MAX})))
            .await
            .unwrap();
        assert_eq!(top, i64::MAX);

        let err = CrudService::create(&pool, &USERS, &object(json!({"id": i64::MAX})))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.get("id").is_some()),
            other => panic!("unexpected error: {other:?}"),
        }

        let below = CrudService::create(&pool, &USERS, &object(json!({"id": i64::MAX - 1})))
            .await
            .unwrap();
        assert_eq!(below, i64::MAX - 1);
        let again = CrudService::create(&pool, &USERS, &object(json!({"id": i64::MAX - 1})))
            .await
            .unwrap_err();
        assert!(matches!(again, AppError::Validation(_)));

        assert_eq!(CrudService::create(&pool, &USERS, &Map::new()).await.unwrap(), 1);
        assert_eq!(CrudService::create(&pool, &USERS, &Map::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn create_reports_bad_id_and_fields_together() {
        let pool = pool().await;
        let err = CrudService::create(&pool, &USERS, &object(json!({"id": "x", "age": "y"})))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.fields().collect::<Vec<_>>(), vec!["age", "id"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(CrudService::list::<User>(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dangling_reference_is_rejected() {
        let pool = pool().await;
        let err = CrudService::create(&pool, &ORDERS, &object(json!({"id": 1, "customer_id": 9})))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.get("customer_id"), Some("no user with id 9"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_missing_row_is_false() {
        let pool = pool().await;
        let found = CrudService::update(&pool, &USERS, 5, &object(json!({"age": 3})))
            .await
            .unwrap();
        assert!(!found);
    }

    #[tokio::test]
    async fn bad_update_changes_nothing() {
        let pool = pool().await;
        CrudService::create(&pool, &USERS, &object(json!({"id": 1, "first_name": "Ann", "age": 30})))
            .await
            .unwrap();
        let err = CrudService::update(&pool, &USERS, 1, &object(json!({"first_name": "Bo", "age": "old"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let user: User = CrudService::read(&pool, 1).await.unwrap().unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Ann"));
        assert_eq!(user.age, Some(30));
    }

    #[tokio::test]
    async fn deleting_user_removes_only_customer_orders() {
        let pool = pool().await;
        for id in [1, 2] {
            CrudService::create(&pool, &USERS, &object(json!({"id": id}))).await.unwrap();
        }
        CrudService::create(&pool, &ORDERS, &object(json!({"id": 10, "customer_id": 1, "executor_id": 2})))
            .await
            .unwrap();
        CrudService::create(&pool, &ORDERS, &object(json!({"id": 11, "customer_id": 2, "executor_id": 1})))
            .await
            .unwrap();
        CrudService::create(&pool, &OFFERS, &object(json!({"id": 100, "order_id": 10, "executor_id": 2})))
            .await
            .unwrap();
        CrudService::create(&pool, &OFFERS, &object(json!({"id": 101, "order_id": 11, "executor_id": 1})))
            .await
            .unwrap();

        assert!(CrudService::delete(&pool, &USERS, 1).await.unwrap());

        let orders: Vec<Order> = CrudService::list(&pool).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, 11);
        assert_eq!(orders[0].customer_id, Some(2));
        assert_eq!(orders[0].executor_id, Some(1));

        let offers: Vec<Offer> = CrudService::list(&pool).await.unwrap();
        let kept: Vec<(i64, Option<i64>, Option<i64>)> =
            offers.iter().map(|o| (o.id, o.order_id, o.executor_id)).collect();
        assert_eq!(kept, vec![(100, Some(10), Some(2)), (101, Some(11), Some(1))]);
    }

    #[tokio::test]
    async fn deleting_executor_leaves_references() {
        let pool = pool().await;
        for id in [1, 2] {
            CrudService::create(&pool, &USERS, &object(json!({"id": id}))).await.unwrap();
        }
        CrudService::create(&pool, &ORDERS, &object(json!({"id": 10, "customer_id": 1, "executor_id": 2})))
            .await
            .unwrap();
        CrudService::create(&pool, &OFFERS, &object(json!({"id": 100, "order_id": 10, "executor_id": 2})))
            .await
            .unwrap();

        assert!(CrudService::delete(&pool, &USERS, 2).await.unwrap());

        let order: Order = CrudService::read(&pool, 10).await.unwrap().unwrap();
        assert_eq!(order.executor_id, Some(2));
        let offer: Offer = CrudService::read(&pool, 100).await.unwrap().unwrap();
        assert_eq!(offer.executor_id, Some(2));
    }

    #[tokio::test]
    async fn deleting_order_keeps_offers() {
        let pool = pool().await;
        CrudService::create(&pool, &ORDERS, &object(json!({"id": 1}))).await.unwrap();
        CrudService::create(&pool, &OFFERS, &object(json!({"id": 1, "order_id": 1}))).await.unwrap();
        assert!(CrudService::delete(&pool, &ORDERS, 1).await.unwrap());
        let offers: Vec<Offer> = CrudService::list(&pool).await.unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].order_id, Some(1));
        assert!(!CrudService::delete(&pool, &ORDERS, 1).await.unwrap());
    }
}
