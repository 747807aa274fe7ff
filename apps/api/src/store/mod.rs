//! Analysis Store and user directory.
//!
//! Records are insert-only. `AppState` carries both traits as trait objects;
//! `PgStore` implements them over PostgreSQL and `MemoryStore` backs the tests.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::analysis::AnalysisRecord;
use crate::models::user::User;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persists a new record. There is no idempotency key: saving the same
    /// analysis twice yields two records.
    async fn save(&self, record: &AnalysisRecord) -> Result<Uuid>;

    /// Persists the record and appends it to its owner's list as one write:
    /// either both happen or neither does.
    async fn save_for_owner(&self, record: &AnalysisRecord) -> Result<Uuid>;

    /// Appends the record to the owner's chronological list.
    async fn append_to_owner(&self, owner_id: Uuid, record_id: Uuid) -> Result<()>;

    /// Every record, oldest first.
    async fn find_all(&self) -> Result<Vec<AnalysisRecord>>;

    /// The owner's records in the order they were appended.
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Vec<AnalysisRecord>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates the account on first sight and refreshes its email otherwise.
    async fn ensure_user(&self, id: Uuid, email: &str) -> Result<User>;

    /// Returns `None` when no such user exists.
    async fn update_name(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<User>>;
}
