//! Person service: a single-entity CRUD resource over HTTP.

pub mod config;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod routes;
pub mod state;
pub mod store;

pub use config::{ServiceConfig, StoreKind};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use model::Person;
pub use routes::{app, common_routes, person_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryPersonStore, PersonStore, PgPersonStore};
