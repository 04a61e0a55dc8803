//! CrudService: generic CRUD over the entity model, plus request value parsing.

mod crud;
mod validation;
pub use crud::CrudService;
pub(crate) use crud::{check_references, insert_row};
pub use validation::{parse_date, parse_value, FieldParser, ParsedFields, INPUT_DATE_FORMAT, ISO_DATE_FORMAT};
