//! StudentService: validated CRUD over an injected record store.

pub mod student;
mod validation;
pub use student::StudentService;
pub use validation::{FieldErrors, RequestValidator, Rule, RuleSet, UniqueCheck, Validated};
