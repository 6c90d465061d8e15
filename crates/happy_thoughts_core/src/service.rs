//! crates/happy_thoughts_core/src/service.rs
//!
//! The thought use cases, written against the `ThoughtRepository` port.
//! Authentication happens before these are called; operations that need a
//! caller take its `Identity` explicitly.

use crate::domain::{validate_message, Identity, NewThought, Thought};
use crate::ports::{PortError, PortResult, ThoughtRepository};
use crate::query::{ListQuery, Page};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const NO_THOUGHTS_FOUND: &str = "No thoughts found for that query.";

#[derive(Clone)]
pub struct ThoughtService {
    repo: Arc<dyn ThoughtRepository>,
}

impl ThoughtService {
    pub fn new(repo: Arc<dyn ThoughtRepository>) -> Self {
        Self { repo }
    }

    /// Fetches everything, then filters, sorts and windows in memory.
    ///
    /// An empty window is reported as `NotFound`.
    pub async fn list(&self, query: &ListQuery) -> PortResult<Page<Thought>> {
        let thoughts = self.repo.list_thoughts().await?;
        let page = query.apply(thoughts);
        if page.items.is_empty() {
            return Err(PortError::NotFound(NO_THOUGHTS_FOUND.to_string()));
        }
        Ok(page)
    }

    pub async fn get(&self, raw_id: &str) -> PortResult<Thought> {
        let id = parse_thought_id(raw_id)?;
        self.repo.get_thought_by_id(id).await
    }

    /// An empty result is a success.
    pub async fn liked_by(&self, client_id: &str) -> PortResult<Vec<Thought>> {
        self.repo.list_thoughts_liked_by(client_id).await
    }

    pub async fn create(
        &self,
        message: Option<String>,
        category: Option<String>,
    ) -> PortResult<Thought> {
        let new_thought = NewThought::new(message, category, Utc::now())?;
        self.repo.insert_thought(new_thought).await
    }

    /// The new message is validated before the thought is looked up.
    pub async fn update_message(
        &self,
        raw_id: &str,
        new_message: Option<String>,
    ) -> PortResult<Thought> {
        let message = new_message.ok_or_else(|| {
            PortError::Validation("Thought validation failed: newMessage is required".to_string())
        })?;
        validate_message(&message)?;
        let id = parse_thought_id(raw_id)?;
        self.repo.update_thought_message(id, &message).await
    }

    pub async fn delete(&self, raw_id: &str) -> PortResult<Thought> {
        let id = parse_thought_id(raw_id)?;
        self.repo.delete_thought(id).await
    }

    pub async fn like(&self, raw_id: &str, identity: &Identity) -> PortResult<Thought> {
        let id = parse_thought_id(raw_id)?;
        self.repo.add_like(id, identity).await
    }

    pub async fn unlike(&self, raw_id: &str, identity: &Identity) -> PortResult<Thought> {
        let id = parse_thought_id(raw_id)?;
        self.repo.remove_like(id, identity).await
    }
}

/// A malformed id can never match a stored thought, so it reads as not found.
fn parse_thought_id(raw_id: &str) -> PortResult<Uuid> {
    Uuid::parse_str(raw_id).map_err(|_| thought_not_found(raw_id))
}

pub fn thought_not_found(id: impl std::fmt::Display) -> PortError {
    PortError::NotFound(format!("Thought {} not found.", id))
}
