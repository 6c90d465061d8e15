//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the storage ports. Used when no
//! `DATABASE_URL` is configured, and by the test suites.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use happy_thoughts_core::domain::{AuthSession, Identity, NewThought, Thought, User, UserCredentials};
use happy_thoughts_core::ports::{AuthProvider, PortError, PortResult, ThoughtRepository};
use happy_thoughts_core::service::thought_not_found;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Thoughts are kept in insertion order; accounts are keyed by email.
#[derive(Default)]
pub struct MemoryStore {
    thoughts: RwLock<Vec<Thought>>,
    users: RwLock<HashMap<String, UserCredentials>>,
    sessions: RwLock<HashMap<String, AuthSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `change` to the thought under the write lock.
    async fn modify<F>(&self, id: Uuid, change: F) -> PortResult<Thought>
    where
        F: FnOnce(&mut Thought) -> PortResult<()> + Send,
    {
        let mut thoughts = self.thoughts.write().await;
        let thought = thoughts
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| thought_not_found(id))?;
        change(thought)?;
        Ok(thought.clone())
    }
}

#[async_trait]
impl ThoughtRepository for MemoryStore {
    async fn list_thoughts(&self) -> PortResult<Vec<Thought>> {
        Ok(self.thoughts.read().await.clone())
    }

    async fn get_thought_by_id(&self, id: Uuid) -> PortResult<Thought> {
        self.thoughts
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| thought_not_found(id))
    }

    async fn list_thoughts_liked_by(&self, client_id: &str) -> PortResult<Vec<Thought>> {
        Ok(self
            .thoughts
            .read()
            .await
            .iter()
            .filter(|t| t.liked_by.iter().any(|id| id == client_id))
            .cloned()
            .collect())
    }

    async fn insert_thought(&self, thought: NewThought) -> PortResult<Thought> {
        let stored = Thought {
            id: Uuid::new_v4(),
            message: thought.message,
            hearts: thought.hearts,
            liked_by: Vec::new(),
            category: thought.category,
            created_at: thought.created_at,
        };
        self.thoughts.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn update_thought_message(&self, id: Uuid, message: &str) -> PortResult<Thought> {
        self.modify(id, |t| {
            t.message = message.to_string();
            Ok(())
        })
        .await
    }

    async fn delete_thought(&self, id: Uuid) -> PortResult<Thought> {
        let mut thoughts = self.thoughts.write().await;
        let index = thoughts
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| thought_not_found(id))?;
        Ok(thoughts.remove(index))
    }

    async fn add_like(&self, id: Uuid, identity: &Identity) -> PortResult<Thought> {
        self.modify(id, |t| t.like(identity)).await
    }

    async fn remove_like(&self, id: Uuid, identity: &Identity) -> PortResult<Thought> {
        self.modify(id, |t| t.unlike(identity)).await
    }

    async fn clear_thoughts(&self) -> PortResult<u64> {
        let mut thoughts = self.thoughts.write().await;
        let removed = thoughts.len() as u64;
        thoughts.clear();
        Ok(removed)
    }
}

#[async_trait]
impl AuthProvider for MemoryStore {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(PortError::Conflict(format!(
                "An account for {} already exists",
                email
            )));
        }
        let credentials = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        users.insert(email.to_string(), credentials.clone());
        Ok(User {
            user_id: credentials.user_id,
            email: credentials.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.users
            .read()
            .await
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions.write().await.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        match self.sessions.read().await.get(session_id) {
            Some(session) if session.expires_at > Utc::now() => Ok(session.user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    async fn stored(store: &MemoryStore, message: &str) -> Thought {
        let new = NewThought::new(Some(message.to_string()), None, Utc::now()).unwrap();
        store.insert_thought(new).await.unwrap()
    }

    #[tokio::test]
    async fn concurrent_likes_from_distinct_callers_are_all_kept() {
        let store = Arc::new(MemoryStore::new());
        let id = stored(&store, "Crowded room").await.id;

        let handles: Vec<_> = (0..32)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .add_like(id, &Identity::new(format!("user-{}", n)))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let after = store.get_thought_by_id(id).await.unwrap();
        assert_eq!(after.hearts, 32);
        assert_eq!(after.liked_by.len(), 32);
    }

    #[tokio::test]
    async fn failed_like_does_not_touch_the_stored_thought() {
        let store = MemoryStore::new();
        let thought = stored(&store, "Quiet morning").await;
        let alice = Identity::new("alice");

        store.add_like(thought.id, &alice).await.unwrap();
        assert!(matches!(
            store.add_like(thought.id, &alice).await,
            Err(PortError::Conflict(_))
        ));

        let after = store.get_thought_by_id(thought.id).await.unwrap();
        assert_eq!(after.hearts, 1);
        assert_eq!(after.liked_by, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn liked_by_lookup_only_returns_matching_thoughts() {
        let store = MemoryStore::new();
        let liked = stored(&store, "Liked one").await;
        stored(&store, "Ignored one").await;
        store.add_like(liked.id, &Identity::new("alice")).await.unwrap();

        let found = store.list_thoughts_liked_by("alice").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, liked.id);
        assert!(store.list_thoughts_liked_by("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_validate() {
        let store = MemoryStore::new();
        let user = store.create_user_with_email("a@b.se", "hash").await.unwrap();

        store
            .create_auth_session("live", user.user_id, Utc::now() + Duration::hours(1))
            .await
            .unwrap();
        store
            .create_auth_session("stale", user.user_id, Utc::now() - Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(store.validate_auth_session("live").await.unwrap(), user.user_id);
        assert!(matches!(
            store.validate_auth_session("stale").await,
            Err(PortError::Unauthorized)
        ));

        store.delete_auth_session("live").await.unwrap();
        assert!(store.validate_auth_session("live").await.is_err());
    }

    #[tokio::test]
    async fn duplicate_emails_conflict() {
        let store = MemoryStore::new();
        store.create_user_with_email("a@b.se", "hash").await.unwrap();
        assert!(matches!(
            store.create_user_with_email("a@b.se", "other").await,
            Err(PortError::Conflict(_))
        ));
    }
}
