//! services/api/src/web/protocol.rs
//!
//! Defines the JSON wire format between HTTP clients and the API server:
//! request payloads, the thought representation, and the
//! `{ success, message, response }` envelope every route answers with.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use happy_thoughts_core::domain::Thought;
use happy_thoughts_core::ports::PortError;
use happy_thoughts_core::query::Page;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

/// Query string accepted by `GET /thoughts`. Numbers arrive as text and are
/// validated by the core list query.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListThoughtsParams {
    /// Case-insensitive exact category match.
    pub category: Option<String>,
    /// `date` sorts newest first; anything else keeps storage order.
    pub sort_by: Option<String>,
    /// 1-based page number, defaults to 1.
    pub page: Option<String>,
    /// Page size, defaults to 10.
    pub limit: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateThoughtRequest {
    pub message: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateThoughtRequest {
    #[serde(rename = "newMessage")]
    pub new_message: Option<String>,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

/// The public representation of a thought.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ThoughtResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub message: String,
    pub hearts: u32,
    pub liked_by: Vec<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl From<Thought> for ThoughtResponse {
    fn from(t: Thought) -> Self {
        Self {
            id: t.id,
            message: t.message,
            hearts: t.hearts,
            liked_by: t.liked_by,
            category: t.category,
            created_at: t.created_at,
        }
    }
}

/// A successful reply: `{ success: true, message, response }`.
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub response: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, response: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            response,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A successful list reply, carrying the window parameters and the size of
/// the filtered set.
#[derive(Serialize, Debug)]
pub struct PageEnvelope<T> {
    pub success: bool,
    pub message: String,
    pub page: u64,
    pub limit: u64,
    pub total: usize,
    pub response: Vec<T>,
}

impl<T: Serialize> PageEnvelope<T> {
    pub fn ok<U>(message: impl Into<String>, page: Page<U>) -> Self
    where
        U: Into<T>,
    {
        Self {
            success: true,
            message: message.into(),
            page: page.page,
            limit: page.limit,
            total: page.total,
            response: page.items.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T: Serialize> IntoResponse for PageEnvelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

//=========================================================================================
// Failure Replies
//=========================================================================================

/// A failed reply: `{ success: false, message, response }`.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
    pub response: Value,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            response: Value::Null,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = response;
        self
    }

    /// Maps a port failure to a reply. `failure` is the operation-level text
    /// used for validation and server errors; not-found and conflict replies
    /// carry the port's own message.
    pub fn from_port(err: PortError, failure: &str) -> Self {
        match err {
            PortError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            PortError::Validation(detail) => {
                Self::new(StatusCode::BAD_REQUEST, failure).with_response(Value::String(detail))
            }
            PortError::Conflict(message) => Self::new(StatusCode::BAD_REQUEST, message),
            PortError::Unauthorized => Self::unauthorized(),
            PortError::Unexpected(detail) => {
                error!("{} {}", failure, detail);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
                    .with_response(Value::String(detail))
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "message": self.message,
            "response": self.response,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thought_serializes_with_client_field_names() {
        let thought = Thought {
            id: Uuid::nil(),
            message: "Hi there".to_string(),
            hearts: 2,
            liked_by: vec!["alice".to_string()],
            category: "Fun".to_string(),
            created_at: "2025-05-19T22:07:08.999Z".parse().unwrap(),
        };
        let value = serde_json::to_value(ThoughtResponse::from(thought)).unwrap();

        assert_eq!(value["_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["likedBy"], json!(["alice"]));
        assert_eq!(value["createdAt"], "2025-05-19T22:07:08.999Z");
        assert!(value.get("liked_by").is_none());
    }

    #[test]
    fn port_errors_map_to_statuses() {
        let cases = [
            (PortError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (PortError::Validation("short".into()), StatusCode::BAD_REQUEST),
            (PortError::Conflict("twice".into()), StatusCode::BAD_REQUEST),
            (PortError::Unauthorized, StatusCode::UNAUTHORIZED),
            (PortError::Unexpected("db down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(HttpError::from_port(err, "Failed.").status, status);
        }
    }

    #[test]
    fn server_errors_carry_the_underlying_detail() {
        let err = HttpError::from_port(PortError::Unexpected("db down".into()), "Couldn't create thought.");
        assert_eq!(err.message, "Couldn't create thought.");
        assert_eq!(err.response, json!("db down"));
    }
}
