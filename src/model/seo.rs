use super::Fillable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Seo {
    pub id: i64,
    pub post_id: i64,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Fillable for Seo {
    const FILLABLE: &'static [&'static str] = &["post_id", "meta_title", "meta_description", "meta_keywords"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Comment;

    #[test]
    fn whitelists_exclude_keys_and_timestamps() {
        for list in [Seo::FILLABLE, Comment::FILLABLE] {
            assert!(!list.contains(&"id"));
            assert!(!list.contains(&"created_at"));
        }
        let filled = Comment::fill([("content".to_string(), 1), ("id".to_string(), 2)]);
        assert_eq!(filled.len(), 1);
    }
}
