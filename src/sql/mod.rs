//! Safe SQL building from entity definitions.

mod builder;
mod params;
pub use builder::{
    delete, dependent_rules, exists_by_id, insert, next_auto_id, next_free_id, select_by_id,
    select_list, update, QueryBuf,
};
pub(crate) use builder::quoted;
pub use params::SqlValue;
