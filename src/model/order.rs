use super::{ColumnDef, Dependent, Entity, EntityDef, FieldKind, OnDelete, OFFERS, USERS};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub static ORDERS: EntityDef = EntityDef {
    table: "orders",
    singular: "order",
    path: "orders",
    columns: &[
        ColumnDef { name: "name", kind: FieldKind::Text },
        ColumnDef { name: "description", kind: FieldKind::Text },
        ColumnDef { name: "start_date", kind: FieldKind::Date },
        ColumnDef { name: "end_date", kind: FieldKind::Date },
        ColumnDef { name: "address", kind: FieldKind::Text },
        ColumnDef { name: "price", kind: FieldKind::Integer },
        ColumnDef { name: "customer_id", kind: FieldKind::Reference(&USERS) },
        ColumnDef { name: "executor_id", kind: FieldKind::Reference(&USERS) },
    ],
    dependents: &[Dependent { entity: &OFFERS, column: "order_id", rule: OnDelete::Keep }],
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Order {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub price: Option<i64>,
    pub customer_id: Option<i64>,
    pub executor_id: Option<i64>,
}

impl Entity for Order {
    fn def() -> &'static EntityDef {
        &ORDERS
    }
}
