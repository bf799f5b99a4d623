//! Person storage: the [`PersonStore`] seam plus its PostgreSQL and in-memory implementations.

mod memory;
mod postgres;

pub use memory::MemoryPersonStore;
pub use postgres::{ensure_database_exists, PgPersonStore};

use crate::error::AppError;
use crate::model::Person;
use async_trait::async_trait;

/// Keyed storage of [`Person`] records. Each call is atomic with respect to other calls.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// The record stored under `id`, or `None`. A missing record is not an error.
    async fn find_by_id(&self, id: i64) -> Result<Option<Person>, AppError>;

    /// Upsert. Without an id, assigns a fresh one and inserts; with an id, creates or
    /// overwrites the record at that id. Returns the persisted record.
    async fn save(&self, person: Person) -> Result<Person, AppError>;

    /// Readiness probe; not part of the data contract.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
