//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ThoughtRepository` and `AuthProvider` ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use happy_thoughts_core::domain::{
    Identity, NewThought, Thought, User, UserCredentials, ALREADY_LIKED, NOT_LIKED,
};
use happy_thoughts_core::ports::{AuthProvider, PortError, PortResult, ThoughtRepository};
use happy_thoughts_core::service::thought_not_found;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const THOUGHT_COLUMNS: &str = "id, message, hearts, liked_by, category, created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports on PostgreSQL.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool once the server has stopped.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn thought_exists(&self, id: Uuid) -> PortResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM thoughts WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ThoughtRecord {
    id: Uuid,
    message: String,
    hearts: i32,
    liked_by: Vec<String>,
    category: String,
    created_at: DateTime<Utc>,
}
impl ThoughtRecord {
    fn to_domain(self) -> Thought {
        Thought {
            id: self.id,
            message: self.message,
            hearts: u32::try_from(self.hearts).unwrap_or(0),
            liked_by: self.liked_by,
            category: self.category,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

//=========================================================================================
// `ThoughtRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ThoughtRepository for DbAdapter {
    async fn list_thoughts(&self) -> PortResult<Vec<Thought>> {
        let records = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "SELECT {THOUGHT_COLUMNS} FROM thoughts ORDER BY created_at ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_thought_by_id(&self, id: Uuid) -> PortResult<Thought> {
        let record = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "SELECT {THOUGHT_COLUMNS} FROM thoughts WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => thought_not_found(id),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn list_thoughts_liked_by(&self, client_id: &str) -> PortResult<Vec<Thought>> {
        let records = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "SELECT {THOUGHT_COLUMNS} FROM thoughts WHERE $1 = ANY(liked_by) ORDER BY created_at ASC, id ASC"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert_thought(&self, thought: NewThought) -> PortResult<Thought> {
        let record = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "INSERT INTO thoughts (id, message, hearts, liked_by, category, created_at) \
             VALUES ($1, $2, $3, '{{}}', $4, $5) RETURNING {THOUGHT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&thought.message)
        .bind(i32::try_from(thought.hearts).unwrap_or(i32::MAX))
        .bind(&thought.category)
        .bind(thought.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_thought_message(&self, id: Uuid, message: &str) -> PortResult<Thought> {
        let record = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "UPDATE thoughts SET message = $2 WHERE id = $1 RETURNING {THOUGHT_COLUMNS}"
        ))
        .bind(id)
        .bind(message)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| thought_not_found(id))?;
        Ok(record.to_domain())
    }

    async fn delete_thought(&self, id: Uuid) -> PortResult<Thought> {
        let record = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "DELETE FROM thoughts WHERE id = $1 RETURNING {THOUGHT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| thought_not_found(id))?;
        Ok(record.to_domain())
    }

    async fn add_like(&self, id: Uuid, identity: &Identity) -> PortResult<Thought> {
        // The membership check and the increment happen in one statement, so
        // concurrent likes from different callers are all kept.
        let updated = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "UPDATE thoughts SET hearts = hearts + 1, liked_by = array_append(liked_by, $2) \
             WHERE id = $1 AND NOT ($2 = ANY(liked_by)) RETURNING {THOUGHT_COLUMNS}"
        ))
        .bind(id)
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match updated {
            Some(record) => Ok(record.to_domain()),
            None if self.thought_exists(id).await? => {
                Err(PortError::Conflict(ALREADY_LIKED.to_string()))
            }
            None => Err(thought_not_found(id)),
        }
    }

    async fn remove_like(&self, id: Uuid, identity: &Identity) -> PortResult<Thought> {
        let updated = sqlx::query_as::<_, ThoughtRecord>(&format!(
            "UPDATE thoughts SET hearts = GREATEST(hearts - 1, 0), liked_by = array_remove(liked_by, $2) \
             WHERE id = $1 AND $2 = ANY(liked_by) RETURNING {THOUGHT_COLUMNS}"
        ))
        .bind(id)
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        match updated {
            Some(record) => Ok(record.to_domain()),
            None if self.thought_exists(id).await? => {
                Err(PortError::Conflict(NOT_LIKED.to_string()))
            }
            None => Err(thought_not_found(id)),
        }
    }

    async fn clear_thoughts(&self) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM thoughts")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }
}

//=========================================================================================
// `AuthProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthProvider for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict(format!("An account for {} already exists", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > now()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
