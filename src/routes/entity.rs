//! Entity CRUD routes: a collection path and an item path per entity.

use crate::handlers::entity::{create, delete as delete_handler, list, read, update};
use crate::model::{Entity, Offer, Order, User};
use crate::state::AppState;
use axum::{routing::get, Router};

fn resource<E: Entity>() -> Router<AppState> {
    let path = E::def().path;
    Router::new()
        .route(&format!("/{}", path), get(list::<E>).post(create::<E>))
        .route(
            &format!("/{}/:id", path),
            get(read::<E>).put(update::<E>).delete(delete_handler::<E>),
        )
}

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .merge(resource::<User>())
        .merge(resource::<Order>())
        .merge(resource::<Offer>())
        .with_state(state)
}
