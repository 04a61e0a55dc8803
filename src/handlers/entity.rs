//! Entity CRUD handlers: list, create, read, update, delete.
//! Generic over the record type; routes instantiate them once per entity.

use crate::error::AppError;
use crate::extractors::{Payload, RecordId};
use crate::model::{Entity, EntityDef};
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

fn not_found(entity: &EntityDef, id: i64) -> AppError {
    AppError::NotFound(format!("{} {}", entity.singular, id))
}

pub async fn list<E: Entity>(State(state): State<AppState>) -> Result<Json<Vec<E>>, AppError> {
    let rows = CrudService::list::<E>(&state.pool).await?;
    Ok(Json(rows))
}

pub async fn create<E: Entity>(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<impl IntoResponse, AppError> {
    let entity = E::def();
    let id = CrudService::create(&state.pool, entity, &body).await?;
    let location = format!("/{}/{}", entity.path, id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], "Done"))
}

pub async fn read<E: Entity>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<E>, AppError> {
    let row = CrudService::read::<E>(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(E::def(), id))?;
    Ok(Json(row))
}

pub async fn update<E: Entity>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Payload(body): Payload,
) -> Result<String, AppError> {
    let entity = E::def();
    if !CrudService::update(&state.pool, entity, id, &body).await? {
        return Err(not_found(entity, id));
    }
    Ok(format!("Updated {} {} success", entity.singular, id))
}

pub async fn delete<E: Entity>(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<String, AppError> {
    let entity = E::def();
    if !CrudService::delete(&state.pool, entity, id).await? {
        return Err(not_found(entity, id));
    }
    Ok(format!("Deleted: {}", id))
}
