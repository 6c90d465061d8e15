//! services/api/src/seed.rs
//!
//! One-shot startup seeding of the thought store from a JSON file.

use chrono::{DateTime, Utc};
use happy_thoughts_core::domain::{validate_message, NewThought, DEFAULT_CATEGORY};
use happy_thoughts_core::ports::{PortError, ThoughtRepository};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {0}: {1}")]
    Read(String, std::io::Error),
    #[error("Failed to parse seed data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to store seed data: {0}")]
    Store(#[from] PortError),
}

/// One entry of the seed file. Extra fields (`_id`, `__v`, ...) are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedThought {
    pub message: String,
    #[serde(default)]
    pub hearts: u32,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

pub fn parse_seed(json: &str) -> Result<Vec<SeedThought>, SeedError> {
    Ok(serde_json::from_str(json)?)
}

pub async fn load_seed_file(path: &Path) -> Result<Vec<SeedThought>, SeedError> {
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeedError::Read(path.display().to_string(), e))?;
    parse_seed(&json)
}

/// Inserts `seeds` into the store and returns how many were written.
///
/// With `reset` the store is cleared first; otherwise a non-empty store is
/// left untouched.
pub async fn seed_thoughts(
    repo: &dyn ThoughtRepository,
    seeds: Vec<SeedThought>,
    reset: bool,
) -> Result<usize, SeedError> {
    if reset {
        let removed = repo.clear_thoughts().await?;
        info!("Cleared {} existing thoughts before seeding", removed);
    } else if !repo.list_thoughts().await?.is_empty() {
        info!("Thought store already populated, skipping seed");
        return Ok(0);
    }

    let mut inserted = 0;
    for seed in seeds {
        if let Err(e) = validate_message(&seed.message) {
            warn!("Skipping seed thought {:?}: {}", seed.message, e);
            continue;
        }
        repo.insert_thought(NewThought {
            message: seed.message,
            category: seed
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            hearts: seed.hearts,
            created_at: seed.created_at.unwrap_or_else(Utc::now),
        })
        .await?;
        inserted += 1;
    }

    info!("Seeded {} thoughts", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;

    const SEED: &str = r#"[
        {"_id": "682bab8b", "message": "Berlin baby", "hearts": 37, "createdAt": "2025-05-19T22:07:08.999Z", "__v": 0},
        {"message": "Hi", "hearts": 1},
        {"message": "Summer is coming", "category": "Fun"}
    ]"#;

    #[test]
    fn parses_documents_with_extra_fields() {
        let seeds = parse_seed(SEED).unwrap();
        assert_eq!(seeds.len(), 3);
        assert_eq!(seeds[0].hearts, 37);
        assert!(seeds[0].created_at.is_some());
        assert_eq!(seeds[2].hearts, 0);
        assert_eq!(seeds[2].category.as_deref(), Some("Fun"));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(parse_seed("{not json"), Err(SeedError::Parse(_))));
    }

    #[tokio::test]
    async fn seeding_skips_short_messages_and_applies_defaults() {
        let store = MemoryStore::new();
        let inserted = seed_thoughts(&store, parse_seed(SEED).unwrap(), false)
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let thoughts = store.list_thoughts().await.unwrap();
        assert_eq!(thoughts[0].category, DEFAULT_CATEGORY);
        assert_eq!(thoughts[0].hearts, 37);
        assert_eq!(thoughts[1].category, "Fun");
    }

    #[tokio::test]
    async fn populated_store_is_left_alone_unless_reset() {
        let store = MemoryStore::new();
        seed_thoughts(&store, parse_seed(SEED).unwrap(), false)
            .await
            .unwrap();

        let again = seed_thoughts(&store, parse_seed(SEED).unwrap(), false)
            .await
            .unwrap();
        assert_eq!(again, 0);
        assert_eq!(store.list_thoughts().await.unwrap().len(), 2);

        let reset = seed_thoughts(&store, parse_seed(SEED).unwrap(), true)
            .await
            .unwrap();
        assert_eq!(reset, 2);
        assert_eq!(store.list_thoughts().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bundled_seed_file_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/thoughts.json");
        let seeds = load_seed_file(&path).await.unwrap();
        assert!(!seeds.is_empty());
    }
}
