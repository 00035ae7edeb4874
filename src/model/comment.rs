use super::Fillable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    /// Set for replies.
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub post_id: i64,
    pub status: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Fillable for Comment {
    const FILLABLE: &'static [&'static str] = &["parent_id", "user_id", "post_id", "status", "content"];
}
