use super::{ColumnDef, Dependent, Entity, EntityDef, FieldKind, OnDelete, OFFERS, ORDERS};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub static USERS: EntityDef = EntityDef {
    table: "users",
    singular: "user",
    path: "users",
    columns: &[
        ColumnDef { name: "first_name", kind: FieldKind::Text },
        ColumnDef { name: "last_name", kind: FieldKind::Text },
        ColumnDef { name: "age", kind: FieldKind::Integer },
        ColumnDef { name: "email", kind: FieldKind::Text },
        ColumnDef { name: "role", kind: FieldKind::Text },
        ColumnDef { name: "phone", kind: FieldKind::Text },
    ],
    dependents: &[
        Dependent { entity: &ORDERS, column: "customer_id", rule: OnDelete::Delete },
        Dependent { entity: &ORDERS, column: "executor_id", rule: OnDelete::Keep },
        Dependent { entity: &OFFERS, column: "executor_id", rule: OnDelete::Keep },
    ],
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
}

impl Entity for User {
    fn def() -> &'static EntityDef {
        &USERS
    }
}
