//! Standard response envelope helpers.
//!
//! Every body has the shape `{status, message?, data?, error?}`; members that
//! are `None` are left out of the JSON.

use crate::service::FieldErrors;
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Either a plain sentence or the per-field validation messages.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Message {
    Text(String),
    Fields(FieldErrors),
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Text(s.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            status: Status::Success,
            message: None,
            data: Some(data),
            error: None,
        }),
    )
}

pub fn success_with_message<T: Serialize>(
    status: StatusCode,
    message: &str,
    data: T,
) -> (StatusCode, Json<Envelope<T>>) {
    (
        status,
        Json(Envelope {
            status: Status::Success,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }),
    )
}

/// Success body that carries only a confirmation message.
pub fn success_message(message: &str) -> (StatusCode, Json<Envelope<()>>) {
    (
        StatusCode::OK,
        Json(Envelope {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
            error: None,
        }),
    )
}

pub fn error_envelope(message: Message, error: Option<String>) -> Json<Envelope<()>> {
    Json(Envelope {
        status: Status::Error,
        message: Some(message),
        data: None,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_members_are_omitted() {
        let (code, Json(body)) = success_message("Student deleted successfully");
        assert_eq!(code, StatusCode::OK);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"status": "success", "message": "Student deleted successfully"})
        );
    }

    #[test]
    fn field_errors_serialize_as_object() {
        let mut fields = FieldErrors::default();
        fields.add("name", "The name field is required.");
        let Json(body) = error_envelope(Message::Fields(fields), None);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"status": "error", "message": {"name": ["The name field is required."]}})
        );
    }
}
