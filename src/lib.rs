//! Marketplace API: REST backend for users, orders and offers on SQLite.

pub mod docs;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod routes;
pub mod seed;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use docs::ApiDoc;
pub use error::{AppError, FieldErrors, SeedError, SettingsError};
pub use migration::apply_migrations;
pub use model::{Entity, EntityDef, Offer, Order, User, ENTITIES};
pub use routes::{app, common_routes_with_ready, entity_routes};
pub use seed::{load_seed, load_seed_file, load_seed_str, SeedCounts, SeedFile};
pub use service::CrudService;
pub use settings::Settings;
pub use state::AppState;
pub use store::connect;
