use super::{ColumnDef, Entity, EntityDef, FieldKind, ORDERS, USERS};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub static OFFERS: EntityDef = EntityDef {
    table: "offers",
    singular: "offer",
    path: "offers",
    columns: &[
        ColumnDef { name: "order_id", kind: FieldKind::Reference(&ORDERS) },
        ColumnDef { name: "executor_id", kind: FieldKind::Reference(&USERS) },
    ],
    dependents: &[],
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Offer {
    pub id: i64,
    pub order_id: Option<i64>,
    pub executor_id: Option<i64>,
}

impl Entity for Offer {
    fn def() -> &'static EntityDef {
        &OFFERS
    }
}
