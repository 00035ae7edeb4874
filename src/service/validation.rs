//! Request validation from declarative per-field rules.

use crate::error::AppError;
use crate::store::StoreError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One check applied to a field value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Present, not null, not blank.
    Required,
    /// At least this many characters.
    MinLength(usize),
    /// No other stored record carries the value (see [`UniqueCheck`]).
    Unique,
}

/// Ordered mapping of field name to the rules it must satisfy.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    fields: Vec<(&'static str, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name, rules.into_iter().collect()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[Rule])> + '_ {
        self.fields.iter().map(|(name, rules)| (*name, rules.as_slice()))
    }
}

/// Field name -> violation messages, in rule order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

/// Validated field values, only for fields named in the rule set.
pub type Validated = BTreeMap<String, String>;

/// Existence lookup backing [`Rule::Unique`].
#[async_trait]
pub trait UniqueCheck: Send + Sync {
    async fn is_taken(&self, field: &str, value: &str) -> Result<bool, StoreError>;
}

pub struct RequestValidator;

impl RequestValidator {
    /// Evaluate every rule of every field before returning, so the caller gets the
    /// full set of violations at once. Rules after a failed `Required` are skipped.
    pub async fn validate(
        body: &HashMap<String, Value>,
        rules: &RuleSet,
        unique: &dyn UniqueCheck,
    ) -> Result<Validated, AppError> {
        let mut errors = FieldErrors::default();
        let mut validated = Validated::new();

        for (field, field_rules) in rules.iter() {
            let text = match body.get(field).map(as_text) {
                None | Some(Ok(None)) => {
                    if field_rules.contains(&Rule::Required) {
                        errors.add(field, format!("The {} field is required.", field));
                    }
                    continue;
                }
                Some(Err(())) => {
                    errors.add(field, format!("The {} field must be a string.", field));
                    continue;
                }
                Some(Ok(Some(text))) => text,
            };

            let mut ok = true;
            for rule in field_rules {
                match rule {
                    Rule::Required => {}
                    Rule::MinLength(min) => {
                        if text.chars().count() < *min {
                            errors.add(
                                field,
                                format!("The {} field must be at least {} characters.", field, min),
                            );
                            ok = false;
                        }
                    }
                    Rule::Unique => {
                        let taken = unique.is_taken(field, &text).await.map_err(|e| {
                            AppError::persistence(
                                format!("Unable to check whether the {} is already taken.", field),
                                &e,
                            )
                        })?;
                        if taken {
                            errors.add(field, format!("The {} has already been taken.", field));
                            ok = false;
                        }
                    }
                }
            }
            if ok {
                validated.insert(field.to_string(), text);
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            tracing::warn!(fields = ?errors, "validation failed");
            Err(AppError::Validation(errors))
        }
    }
}

/// Scalars become text; strings are trimmed first, so null and blank strings
/// count as absent. Containers are rejected.
fn as_text(v: &Value) -> Result<Option<String>, ()> {
    match v {
        Value::Null => Ok(None),
        Value::String(s) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(()),
    }
}
