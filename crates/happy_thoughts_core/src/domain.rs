//! crates/happy_thoughts_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use crate::ports::{PortError, PortResult};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Category assigned to a thought created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Minimum number of characters a thought message must contain.
pub const MIN_MESSAGE_CHARS: usize = 3;

pub const ALREADY_LIKED: &str = "You have already liked this thought";
pub const NOT_LIKED: &str = "You haven't liked this thought";

/// The authenticated caller, as derived from a bearer token.
///
/// This is the value recorded in `Thought::liked_by`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for Identity {
    fn from(user_id: Uuid) -> Self {
        Self(user_id.to_string())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single short text post.
#[derive(Debug, Clone, PartialEq)]
pub struct Thought {
    pub id: Uuid,
    pub message: String,
    pub hearts: u32,
    pub liked_by: Vec<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Thought {
    pub fn is_liked_by(&self, identity: &Identity) -> bool {
        self.liked_by.iter().any(|id| id == identity.as_str())
    }

    /// Records a like from `identity`, bumping `hearts` alongside `liked_by`.
    pub fn like(&mut self, identity: &Identity) -> PortResult<()> {
        if self.is_liked_by(identity) {
            return Err(PortError::Conflict(ALREADY_LIKED.to_string()));
        }
        self.hearts = self.hearts.saturating_add(1);
        self.liked_by.push(identity.as_str().to_string());
        Ok(())
    }

    /// Withdraws a like from `identity`. `hearts` never drops below zero.
    pub fn unlike(&mut self, identity: &Identity) -> PortResult<()> {
        if !self.is_liked_by(identity) {
            return Err(PortError::Conflict(NOT_LIKED.to_string()));
        }
        self.hearts = self.hearts.saturating_sub(1);
        self.liked_by.retain(|id| id != identity.as_str());
        Ok(())
    }
}

/// A validated thought that has not been stored yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewThought {
    pub message: String,
    pub category: String,
    pub hearts: u32,
    pub created_at: DateTime<Utc>,
}

impl NewThought {
    /// Builds a fresh thought with no hearts, applying the default category.
    pub fn new(
        message: Option<String>,
        category: Option<String>,
        created_at: DateTime<Utc>,
    ) -> PortResult<Self> {
        let message = message.ok_or_else(|| {
            PortError::Validation("Thought validation failed: message is required".to_string())
        })?;
        validate_message(&message)?;

        Ok(Self {
            message,
            category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            hearts: 0,
            created_at,
        })
    }
}

/// Enforces the minimum message length on create and update.
pub fn validate_message(message: &str) -> PortResult<()> {
    let chars = message.chars().count();
    if chars < MIN_MESSAGE_CHARS {
        return Err(PortError::Validation(format!(
            "Thought validation failed: message must be at least {} characters, got {}",
            MIN_MESSAGE_CHARS, chars
        )));
    }
    Ok(())
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// An issued bearer token and the user it resolves to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thought() -> Thought {
        Thought {
            id: Uuid::new_v4(),
            message: "Sunny day".to_string(),
            hearts: 0,
            liked_by: Vec::new(),
            category: DEFAULT_CATEGORY.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn like_then_unlike_restores_state() {
        let mut t = thought();
        let before = t.clone();
        let alice = Identity::new("alice");

        t.like(&alice).unwrap();
        assert_eq!(t.hearts, 1);
        assert_eq!(t.liked_by, vec!["alice".to_string()]);

        t.unlike(&alice).unwrap();
        assert_eq!(t, before);
    }

    #[test]
    fn double_like_is_a_conflict_and_leaves_state_alone() {
        let mut t = thought();
        let alice = Identity::new("alice");
        t.like(&alice).unwrap();
        let after_first = t.clone();

        let err = t.like(&alice).unwrap_err();
        assert!(matches!(err, PortError::Conflict(ref m) if m == ALREADY_LIKED));
        assert_eq!(t, after_first);
    }

    #[test]
    fn unlike_without_like_is_a_conflict() {
        let mut t = thought();
        let before = t.clone();

        let err = t.unlike(&Identity::new("bob")).unwrap_err();
        assert!(matches!(err, PortError::Conflict(ref m) if m == NOT_LIKED));
        assert_eq!(t, before);
    }

    #[test]
    fn unlike_floors_hearts_at_zero() {
        // Seeded records can list a liker without a matching heart.
        let mut t = thought();
        t.liked_by.push("carol".to_string());

        t.unlike(&Identity::new("carol")).unwrap();
        assert_eq!(t.hearts, 0);
        assert!(t.liked_by.is_empty());
    }

    #[test]
    fn likes_from_different_identities_accumulate() {
        let mut t = thought();
        t.like(&Identity::new("alice")).unwrap();
        t.like(&Identity::new("bob")).unwrap();

        assert_eq!(t.hearts, 2);
        assert!(t.is_liked_by(&Identity::new("bob")));
    }

    #[test]
    fn new_thought_applies_defaults() {
        let now = Utc::now();
        let new = NewThought::new(Some("Hi there".to_string()), None, now).unwrap();

        assert_eq!(new.category, DEFAULT_CATEGORY);
        assert_eq!(new.hearts, 0);
        assert_eq!(new.created_at, now);
    }

    #[test]
    fn short_or_missing_messages_are_rejected() {
        let now = Utc::now();
        assert!(matches!(
            NewThought::new(Some("Hi".to_string()), None, now),
            Err(PortError::Validation(_))
        ));
        assert!(matches!(
            NewThought::new(None, Some("Fun".to_string()), now),
            Err(PortError::Validation(_))
        ));
    }

    #[test]
    fn message_length_counts_characters_not_bytes() {
        assert!(validate_message("héé").is_ok());
        assert!(validate_message("😀😀").is_err());
    }
}
