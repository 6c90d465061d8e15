//! crates/happy_thoughts_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::{Identity, NewThought, Thought, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage of thoughts.
///
/// Like and unlike are single operations so the store can apply the membership
/// check and the mutation atomically.
#[async_trait]
pub trait ThoughtRepository: Send + Sync {
    /// Every stored thought, in storage order.
    async fn list_thoughts(&self) -> PortResult<Vec<Thought>>;

    async fn get_thought_by_id(&self, id: Uuid) -> PortResult<Thought>;

    /// Thoughts whose `liked_by` contains `client_id`.
    async fn list_thoughts_liked_by(&self, client_id: &str) -> PortResult<Vec<Thought>>;

    async fn insert_thought(&self, thought: NewThought) -> PortResult<Thought>;

    async fn update_thought_message(&self, id: Uuid, message: &str) -> PortResult<Thought>;

    /// Removes the thought and returns its last state.
    async fn delete_thought(&self, id: Uuid) -> PortResult<Thought>;

    async fn add_like(&self, id: Uuid, identity: &Identity) -> PortResult<Thought>;

    async fn remove_like(&self, id: Uuid, identity: &Identity) -> PortResult<Thought>;

    /// Removes every thought, returning how many were deleted.
    async fn clear_thoughts(&self) -> PortResult<u64>;
}

/// Accounts and the bearer tokens issued to them.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a live token to its user, or fails with `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}
