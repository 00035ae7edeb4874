//! Record store boundary for students. The service only sees [`StudentStore`];
//! Postgres and in-memory implementations live in submodules.

mod memory;
mod postgres;

pub use memory::InMemoryStudentStore;
pub use postgres::PgStudentStore;

use crate::model::{Student, StudentFields};
use async_trait::async_trait;
use thiserror::Error;

/// Name of the unique constraint guarding `students.email`.
pub const STUDENTS_EMAIL_UNIQUE: &str = "students_email_unique";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Db(sqlx::Error),
    #[error("duplicate value for unique field '{field}'")]
    UniqueViolation { field: &'static str },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() && db.constraint() == Some(STUDENTS_EMAIL_UNIQUE) {
                return StoreError::UniqueViolation { field: "email" };
            }
        }
        StoreError::Db(e)
    }
}

#[async_trait]
pub trait StudentStore: Send + Sync {
    /// All records in store-native order.
    async fn find_all(&self) -> Result<Vec<Student>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, StoreError>;

    /// True when a record other than `excluded_id` has this email.
    async fn exists_by_email_excluding(
        &self,
        email: &str,
        excluded_id: Option<i64>,
    ) -> Result<bool, StoreError>;

    /// Insert and return the created record. `Ok(None)` means the store accepted
    /// the call but produced no row. Email uniqueness is enforced here too.
    async fn insert(&self, fields: &StudentFields) -> Result<Option<Student>, StoreError>;

    /// Overwrite all fields of `id`. `Ok(None)` when the record no longer exists.
    async fn update_by_id(
        &self,
        id: i64,
        fields: &StudentFields,
    ) -> Result<Option<Student>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
