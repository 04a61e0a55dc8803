//! Extract the integer record id from the `/:id` path segment.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Primary key from the item path. A non-integer segment is a bad request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;
        raw.trim()
            .parse::<i64>()
            .map(RecordId)
            .map_err(|_| AppError::BadRequest(format!("invalid id: '{}'", raw)))
    }
}
