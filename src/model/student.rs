use super::Fillable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub gender: String,
}

impl Fillable for Student {
    const FILLABLE: &'static [&'static str] = &["name", "email", "gender"];
}

/// Everything a student has except the store-assigned id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFields {
    pub name: String,
    pub email: String,
    pub gender: String,
}

impl StudentFields {
    /// Build from validated input. Non-fillable keys are ignored.
    pub fn from_validated(validated: BTreeMap<String, String>) -> Self {
        let mut attrs = Student::fill(validated);
        let mut take = |k: &str| attrs.remove(k).unwrap_or_default();
        Self {
            name: take("name"),
            email: take("email"),
            gender: take("gender"),
        }
    }

    pub fn into_student(self, id: i64) -> Student {
        Student {
            id,
            name: self.name,
            email: self.email,
            gender: self.gender,
        }
    }
}
