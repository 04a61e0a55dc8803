//! Request extractors for entity handlers.

pub mod payload;
pub mod record_id;

pub use payload::Payload;
pub use record_id::RecordId;
