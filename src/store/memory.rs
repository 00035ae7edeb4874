use super::{StoreError, StudentStore};
use crate::model::{Student, StudentFields};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, Student>,
    /// Last id handed out; ids are never reused after deletion.
    last_id: i64,
}

impl Table {
    fn email_taken(&self, email: &str, excluded_id: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|s| s.email == email && Some(s.id) != excluded_id)
    }
}

/// Process-local store. Uniqueness check and write happen under one write lock.
#[derive(Default)]
pub struct InMemoryStudentStore {
    table: RwLock<Table>,
}

impl InMemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.read().map(|t| t.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Table>, StoreError> {
        self.table
            .read()
            .map_err(|_| StoreError::Unavailable("student table lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Table>, StoreError> {
        self.table
            .write()
            .map_err(|_| StoreError::Unavailable("student table lock poisoned".into()))
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn find_all(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.read()?.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn exists_by_email_excluding(
        &self,
        email: &str,
        excluded_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        Ok(self.read()?.email_taken(email, excluded_id))
    }

    async fn insert(&self, fields: &StudentFields) -> Result<Option<Student>, StoreError> {
        let mut table = self.write()?;
        if table.email_taken(&fields.email, None) {
            return Err(StoreError::UniqueViolation { field: "email" });
        }
        table.last_id += 1;
        let student = fields.clone().into_student(table.last_id);
        table.rows.insert(student.id, student.clone());
        Ok(Some(student))
    }

    async fn update_by_id(
        &self,
        id: i64,
        fields: &StudentFields,
    ) -> Result<Option<Student>, StoreError> {
        let mut table = self.write()?;
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        if table.email_taken(&fields.email, Some(id)) {
            return Err(StoreError::UniqueViolation { field: "email" });
        }
        let student = fields.clone().into_student(id);
        table.rows.insert(id, student.clone());
        Ok(Some(student))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.write()?.rows.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }
}
