//! Extract a request body as a JSON object from either a form or a JSON payload.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use serde_json::{Map, Value};

/// Body fields keyed by name.
///
/// `application/x-www-form-urlencoded` values arrive as strings and empty values
/// are dropped. `application/json` (or no content type) must be a JSON object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload(pub Map<String, Value>);

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Form,
    Json,
    Other(String),
}

fn body_kind(content_type: Option<&str>) -> BodyKind {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .unwrap_or_default();
    match mime.as_str() {
        "application/x-www-form-urlencoded" => BodyKind::Form,
        "" | "application/json" => BodyKind::Json,
        m if m.ends_with("+json") => BodyKind::Json,
        _ => BodyKind::Other(mime),
    }
}

fn form_to_map(pairs: Vec<(String, String)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

fn json_to_map(bytes: &[u8]) -> Result<Map<String, Value>, AppError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        match body_kind(content_type.as_deref()) {
            BodyKind::Form => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;
                Ok(Payload(form_to_map(pairs)))
            }
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|e| AppError::Rejected(e.status(), e.body_text()))?;
                Ok(Payload(json_to_map(&bytes)?))
            }
            BodyKind::Other(mime) => Err(AppError::UnsupportedMediaType(mime)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_detection() {
        assert_eq!(
            body_kind(Some("application/x-www-form-urlencoded; charset=utf-8")),
            BodyKind::Form
        );
        assert_eq!(body_kind(Some("Application/JSON")), BodyKind::Json);
        assert_eq!(body_kind(Some("application/merge-patch+json")), BodyKind::Json);
        assert_eq!(body_kind(None), BodyKind::Json);
        assert_eq!(body_kind(Some("text/plain")), BodyKind::Other("text/plain".into()));
    }

    #[test]
    fn empty_form_values_are_dropped() {
        let map = form_to_map(vec![
            ("id".into(), "3".into()),
            ("age".into(), " ".into()),
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("id"), Some(&Value::String("3".into())));
    }

    #[test]
    fn json_body_must_be_an_object() {
        assert!(json_to_map(br#"{"age": 3}"#).is_ok());
        assert!(matches!(json_to_map(b"[1, 2]"), Err(AppError::BadRequest(_))));
        assert!(matches!(json_to_map(b"not json"), Err(AppError::BadRequest(_))));
    }
}
