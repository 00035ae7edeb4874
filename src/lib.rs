//! Roster: validated CRUD REST service for student records.

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Settings, StoreBackend};
pub use database::{connect, ensure_database_exists};
pub use error::{AppError, ConfigError};
pub use migration::{apply_migrations, rollback_last};
pub use model::{Fillable, Student, StudentFields};
pub use response::{success, success_message, success_with_message, Envelope};
pub use routes::{app, common_routes, common_routes_with_ready, student_routes};
pub use service::StudentService;
pub use state::AppState;
pub use store::{InMemoryStudentStore, PgStudentStore, StoreError, StudentStore};
