//! Validated CRUD lifecycle for students.
//!
//! Each operation validates first, then checks existence, then touches the
//! store exactly once. Nothing is written when validation or the existence
//! check fails.

use crate::error::AppError;
use crate::model::{Student, StudentFields};
use crate::service::validation::{RequestValidator, Rule, RuleSet, UniqueCheck};
use crate::store::{StoreError, StudentStore};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub const NOT_FOUND: &str = "This student does not exist";
pub const SAVE_FAILED: &str = "Failed to save student.";
pub const SAVE_ERROR: &str = "An error occurred while saving the student.";
pub const UPDATE_ERROR: &str = "An error occurred while updating the student.";
pub const DELETE_ERROR: &str = "An error occurred while deleting the student.";
pub const LOAD_ERROR: &str = "An error occurred while loading students.";

const MIN_NAME_LENGTH: usize = 4;

#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn StudentStore>,
}

/// Email uniqueness against the store, optionally ignoring the record being updated.
struct EmailLookup<'a> {
    store: &'a dyn StudentStore,
    exclude: Option<i64>,
}

#[async_trait]
impl UniqueCheck for EmailLookup<'_> {
    async fn is_taken(&self, field: &str, value: &str) -> Result<bool, StoreError> {
        match field {
            "email" => self.store.exists_by_email_excluding(value, self.exclude).await,
            _ => Ok(false),
        }
    }
}

impl StudentService {
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    pub fn rules() -> RuleSet {
        RuleSet::new()
            .field("name", [Rule::Required, Rule::MinLength(MIN_NAME_LENGTH)])
            .field("email", [Rule::Required, Rule::Unique])
            .field("gender", [Rule::Required])
    }

    pub async fn list(&self) -> Result<Vec<Student>, AppError> {
        self.store
            .find_all()
            .await
            .map_err(|e| AppError::persistence(LOAD_ERROR, &e))
    }

    pub async fn create(&self, body: &HashMap<String, Value>) -> Result<Student, AppError> {
        let fields = self.validate(body, None).await?;
        match self.store.insert(&fields).await {
            Ok(Some(student)) => {
                tracing::info!(student_id = student.id, email = %student.email, "student created");
                Ok(student)
            }
            Ok(None) => Err(AppError::Persistence {
                context: SAVE_FAILED.into(),
                detail: None,
            }),
            Err(e) => Err(Self::write_error(SAVE_ERROR, e)),
        }
    }

    pub async fn show(&self, id: i64) -> Result<Student, AppError> {
        self.find(id).await
    }

    /// Full overwrite of name, email and gender. The record may keep its own email.
    pub async fn update(&self, id: i64, body: &HashMap<String, Value>) -> Result<Student, AppError> {
        let fields = self.validate(body, Some(id)).await?;
        self.find(id).await?;
        match self.store.update_by_id(id, &fields).await {
            Ok(Some(student)) => {
                tracing::info!(student_id = id, "student updated");
                Ok(student)
            }
            // Removed between the lookup and the write.
            Ok(None) => Err(AppError::NotFound(NOT_FOUND.into())),
            Err(e) => Err(Self::write_error(UPDATE_ERROR, e)),
        }
    }

    pub async fn destroy(&self, id: i64) -> Result<(), AppError> {
        self.find(id).await?;
        match self.store.delete_by_id(id).await {
            Ok(true) => {
                tracing::info!(student_id = id, "student deleted");
                Ok(())
            }
            Ok(false) => Err(AppError::NotFound(NOT_FOUND.into())),
            Err(e) => Err(AppError::persistence(DELETE_ERROR, &e)),
        }
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    async fn validate(
        &self,
        body: &HashMap<String, Value>,
        exclude: Option<i64>,
    ) -> Result<StudentFields, AppError> {
        let lookup = EmailLookup {
            store: self.store.as_ref(),
            exclude,
        };
        let validated = RequestValidator::validate(body, &Self::rules(), &lookup).await?;
        Ok(StudentFields::from_validated(validated))
    }

    async fn find(&self, id: i64) -> Result<Student, AppError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| AppError::persistence(LOAD_ERROR, &e))?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
    }

    /// A uniqueness violation caught by the store reads the same as the pre-check.
    fn write_error(context: &str, e: StoreError) -> AppError {
        match e {
            StoreError::UniqueViolation { field } => {
                tracing::warn!(field, "unique constraint rejected write");
                AppError::Validation(crate::service::FieldErrors::single(
                    field,
                    format!("The {} has already been taken.", field),
                ))
            }
            other => AppError::persistence(context, &other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStudentStore;
    use serde_json::json;

    fn body(v: Value) -> HashMap<String, Value> {
        match v {
            Value::Object(m) => m.into_iter().collect(),
            _ => panic!("object expected"),
        }
    }

    fn alice() -> HashMap<String, Value> {
        body(json!({"name": "Alice Smith", "email": "alice@example.com", "gender": "female"}))
    }

    fn service() -> (Arc<InMemoryStudentStore>, StudentService) {
        let store = Arc::new(InMemoryStudentStore::new());
        (store.clone(), StudentService::new(store))
    }

    /// Accepts lookups, never returns a created row.
    struct SilentStore;

    #[async_trait]
    impl StudentStore for SilentStore {
        async fn find_all(&self) -> Result<Vec<Student>, StoreError> {
            Ok(Vec::new())
        }
        async fn find_by_id(&self, _id: i64) -> Result<Option<Student>, StoreError> {
            Ok(None)
        }
        async fn exists_by_email_excluding(&self, _e: &str, _x: Option<i64>) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn insert(&self, _f: &StudentFields) -> Result<Option<Student>, StoreError> {
            Ok(None)
        }
        async fn update_by_id(&self, _id: i64, _f: &StudentFields) -> Result<Option<Student>, StoreError> {
            Ok(None)
        }
        async fn delete_by_id(&self, _id: i64) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn stored(id: i64) -> Student {
        Student {
            id,
            name: "Alice Smith".into(),
            email: "alice@example.com".into(),
            gender: "female".into(),
        }
    }

    /// Reads work, writes fail.
    struct ReadOnlyStore;

    #[async_trait]
    impl StudentStore for ReadOnlyStore {
        async fn find_all(&self) -> Result<Vec<Student>, StoreError> {
            Ok(Vec::new())
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<Student>, StoreError> {
            Ok(Some(stored(id)))
        }
        async fn exists_by_email_excluding(&self, _e: &str, _x: Option<i64>) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn insert(&self, _f: &StudentFields) -> Result<Option<Student>, StoreError> {
            Err(StoreError::Unavailable("read-only replica".into()))
        }
        async fn update_by_id(&self, _id: i64, _f: &StudentFields) -> Result<Option<Student>, StoreError> {
            Err(StoreError::Unavailable("read-only replica".into()))
        }
        async fn delete_by_id(&self, _id: i64) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("read-only replica".into()))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Pre-check sees a free email; the write loses a race on the unique constraint.
    struct RacedStore;

    #[async_trait]
    impl StudentStore for RacedStore {
        async fn find_all(&self) -> Result<Vec<Student>, StoreError> {
            Ok(Vec::new())
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<Student>, StoreError> {
            Ok(Some(stored(id)))
        }
        async fn exists_by_email_excluding(&self, _e: &str, _x: Option<i64>) -> Result<bool, StoreError> {
            Ok(false)
        }
        async fn insert(&self, _f: &StudentFields) -> Result<Option<Student>, StoreError> {
            Err(StoreError::UniqueViolation { field: "email" })
        }
        async fn update_by_id(&self, _id: i64, _f: &StudentFields) -> Result<Option<Student>, StoreError> {
            Err(StoreError::UniqueViolation { field: "email" })
        }
        async fn delete_by_id(&self, _id: i64) -> Result<bool, StoreError> {
            Ok(true)
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn assert_email_taken(result: Result<Student, AppError>) {
        match result {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields.get("email").unwrap(), ["The email has already been taken."]);
                assert_eq!(fields.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn store_unique_violation_reads_as_validation_error() {
        let svc = StudentService::new(Arc::new(RacedStore));
        assert_email_taken(svc.create(&alice()).await);
        assert_email_taken(svc.update(1, &alice()).await);
    }

    #[tokio::test]
    async fn update_and_destroy_faults_carry_diagnostic() {
        let svc = StudentService::new(Arc::new(ReadOnlyStore));
        match svc.update(1, &alice()).await {
            Err(AppError::Persistence { context, detail }) => {
                assert_eq!(context, UPDATE_ERROR);
                assert_eq!(detail.as_deref(), Some("store unavailable: read-only replica"));
            }
            other => panic!("unexpected {:?}", other),
        }
        match svc.destroy(1).await {
            Err(AppError::Persistence { context, detail }) => {
                assert_eq!(context, DELETE_ERROR);
                assert_eq!(detail.as_deref(), Some("store unavailable: read-only replica"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_then_show_returns_same_fields() {
        let (_, svc) = service();
        let created = svc.create(&alice()).await.unwrap();
        let shown = svc.show(created.id).await.unwrap();
        assert_eq!(shown, created);
        assert_eq!(shown.name, "Alice Smith");
        assert_eq!(shown.gender, "female");
    }

    #[tokio::test]
    async fn short_names_never_persist() {
        let (store, svc) = service();
        for name in ["", "A", "Al", "Ali"] {
            let err = svc
                .create(&body(json!({"name": name, "email": "x@y.com", "gender": "m"})))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{name:?}");
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_rejected_on_create() {
        let (store, svc) = service();
        svc.create(&alice()).await.unwrap();
        let err = svc
            .create(&body(json!({"name": "Alice Jones", "email": "alice@example.com", "gender": "female"})))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.get("email").unwrap(), ["The email has already been taken."]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_own_email_and_id() {
        let (_, svc) = service();
        let created = svc.create(&alice()).await.unwrap();
        let updated = svc
            .update(
                created.id,
                &body(json!({"name": "Alice Cooper", "email": "alice@example.com", "gender": "other"})),
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.email, created.email);
        assert_eq!(svc.show(created.id).await.unwrap().name, "Alice Cooper");
    }

    #[tokio::test]
    async fn update_cannot_take_another_email() {
        let (_, svc) = service();
        let a = svc.create(&alice()).await.unwrap();
        svc.create(&body(json!({"name": "Brian May", "email": "brian@example.com", "gender": "male"})))
            .await
            .unwrap();
        let err = svc
            .update(a.id, &body(json!({"name": "Alice", "email": "brian@example.com", "gender": "female"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(svc.show(a.id).await.unwrap().email, "alice@example.com");
    }

    #[tokio::test]
    async fn update_validates_before_existence() {
        let (_, svc) = service();
        let err = svc.update(99, &body(json!({"name": "Al"}))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = svc.update(99, &alice()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn destroy_missing_leaves_store_untouched() {
        let (store, svc) = service();
        svc.create(&alice()).await.unwrap();
        let err = svc.destroy(999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == NOT_FOUND));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn destroy_removes_permanently() {
        let (_, svc) = service();
        let created = svc.create(&alice()).await.unwrap();
        svc.destroy(created.id).await.unwrap();
        assert!(matches!(svc.show(created.id).await, Err(AppError::NotFound(_))));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_insert_result_is_save_failure() {
        let svc = StudentService::new(Arc::new(SilentStore));
        match svc.create(&alice()).await {
            Err(AppError::Persistence { context, detail }) => {
                assert_eq!(context, SAVE_FAILED);
                assert!(detail.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn store_fault_carries_diagnostic() {
        let svc = StudentService::new(Arc::new(ReadOnlyStore));
        match svc.create(&alice()).await {
            Err(AppError::Persistence { context, detail }) => {
                assert_eq!(context, SAVE_ERROR);
                assert_eq!(detail.as_deref(), Some("store unavailable: read-only replica"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
