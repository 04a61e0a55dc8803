//! Request value parsing driven by the entity model.

use crate::error::FieldErrors;
use crate::model::{EntityDef, FieldKind, PK_COLUMN};
use crate::sql::SqlValue;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Date format accepted on input (seed file, POST and PUT bodies).
pub const INPUT_DATE_FORMAT: &str = "%m/%d/%Y";
/// Storage and output format; also accepted on input so a GET result can be written back.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parsed column values in column order, ready to bind.
pub type ParsedFields = Vec<(&'static str, SqlValue)>;

pub struct FieldParser;

impl FieldParser {
    /// Parse every known column present in `body`. Unknown keys are skipped; every
    /// known key with a bad value is reported.
    pub fn parse(entity: &EntityDef, body: &Map<String, Value>) -> Result<ParsedFields, FieldErrors> {
        let mut out = Vec::new();
        let mut errors = FieldErrors::new();
        for col in entity.columns {
            let Some(v) = body.get(col.name) else {
                continue;
            };
            match parse_value(&col.kind, v) {
                Ok(value) => out.push((col.name, value)),
                Err(reason) => errors.push(col.name, reason),
            }
        }
        if errors.is_empty() {
            Ok(out)
        } else {
            Err(errors)
        }
    }

    /// Parse the primary key from `body`. `Ok(None)` when absent or null.
    pub fn parse_id(body: &Map<String, Value>) -> Result<Option<i64>, String> {
        match body.get(PK_COLUMN) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => parse_integer(v).map(Some),
        }
    }
}

/// Null is accepted for every kind and clears the column.
pub fn parse_value(kind: &FieldKind, v: &Value) -> Result<SqlValue, String> {
    if v.is_null() {
        return Ok(SqlValue::Null);
    }
    match kind {
        FieldKind::Text => parse_text(v).map(SqlValue::Text),
        FieldKind::Integer | FieldKind::Reference(_) => parse_integer(v).map(SqlValue::I64),
        FieldKind::Date => parse_date(v).map(SqlValue::Date),
    }
}

fn parse_text(v: &Value) -> Result<String, String> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err("expected a string".into()),
    }
}

fn parse_integer(v: &Value) -> Result<i64, String> {
    match v {
        Value::Number(n) => n.as_i64().ok_or_else(|| "expected an integer".into()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected an integer, got '{}'", s)),
        _ => Err("expected an integer".into()),
    }
}

/// `MM/DD/YYYY`, or ISO `YYYY-MM-DD`.
pub fn parse_date(v: &Value) -> Result<NaiveDate, String> {
    let s = v
        .as_str()
        .ok_or_else(|| "expected a date string (MM/DD/YYYY)".to_string())?
        .trim();
    NaiveDate::parse_from_str(s, INPUT_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(s, ISO_DATE_FORMAT))
        .map_err(|_| format!("expected a date as MM/DD/YYYY, got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ORDERS, USERS};
    use serde_json::json;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn parses_known_fields_in_column_order() {
        let body = object(json!({"phone": "555", "first_name": "Ann", "age": "31"}));
        let parsed = FieldParser::parse(&USERS, &body).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("first_name", SqlValue::Text("Ann".into())),
                ("age", SqlValue::I64(31)),
                ("phone", SqlValue::Text("555".into())),
            ]
        );
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let body = object(json!({"nickname": "x", "id": 4}));
        assert!(FieldParser::parse(&USERS, &body).unwrap().is_empty());
    }

    #[test]
    fn reports_every_bad_field() {
        let body = object(json!({
            "age": "old",
            "first_name": ["a"],
            "last_name": "Ok"
        }));
        let errors = FieldParser::parse(&USERS, &body).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["age", "first_name"]);
    }

    #[test]
    fn dates_accept_us_and_iso_forms() {
        assert_eq!(
            parse_date(&json!("02/27/2013")).unwrap(),
            NaiveDate::from_ymd_opt(2013, 2, 27).unwrap()
        );
        assert_eq!(
            parse_date(&json!("2013-02-27")).unwrap(),
            NaiveDate::from_ymd_opt(2013, 2, 27).unwrap()
        );
        assert!(parse_date(&json!("27/02/2013")).is_err());
        assert!(parse_date(&json!(20130227)).is_err());
    }

    #[test]
    fn order_price_accepts_numeric_strings_only() {
        let ok = FieldParser::parse(&ORDERS, &object(json!({"price": " 4500 "}))).unwrap();
        assert_eq!(ok, vec![("price", SqlValue::I64(4500))]);
        let bad = FieldParser::parse(&ORDERS, &object(json!({"price": 12.5}))).unwrap_err();
        assert_eq!(bad.get("price"), Some("expected an integer"));
    }

    #[test]
    fn null_clears_any_kind() {
        let parsed = FieldParser::parse(&ORDERS, &object(json!({"start_date": null}))).unwrap();
        assert_eq!(parsed, vec![("start_date", SqlValue::Null)]);
    }

    #[test]
    fn text_accepts_scalars() {
        assert_eq!(parse_text(&json!(42)).unwrap(), "42");
        assert!(parse_text(&json!({"a": 1})).is_err());
    }

    #[test]
    fn id_parsing() {
        assert_eq!(FieldParser::parse_id(&object(json!({}))), Ok(None));
        assert_eq!(FieldParser::parse_id(&object(json!({"id": "12"}))), Ok(Some(12)));
        assert!(FieldParser::parse_id(&object(json!({"id": "x"}))).is_err());
    }
}
