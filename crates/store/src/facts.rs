//! In-memory fact store.
//!
//! Facts are kept in insertion order. Selection for a goal takes keyword
//! matches first, then tops up with the newest facts from the preferred
//! categories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use goal_agent_core::{config::StoreConfig, traits::FactStore, types::Fact, Error, Result};

/// Hard cap on facts handed to the planner.
pub const MAX_CONTEXT_FACTS: usize = 7;

/// Limits for [`FactStore::retrieve_relevant`].
#[derive(Debug, Clone)]
pub struct FactSelection {
    pub max_keyword_facts: usize,
    pub max_category_facts: usize,
    pub preferred_categories: Vec<String>,
}

impl Default for FactSelection {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for FactSelection {
    fn from(cfg: &StoreConfig) -> Self {
        Self {
            max_keyword_facts: cfg.max_keyword_facts,
            max_category_facts: cfg.max_category_facts,
            preferred_categories: cfg.preferred_categories.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredFact {
    id: String,
    fact: Fact,
    // Lowercased once at insert time
    needle: String,
    added_at: DateTime<Utc>,
}

/// Fact store backed by a vector behind an async lock.
pub struct InMemoryFactStore {
    entries: Arc<RwLock<Vec<StoredFact>>>,
    selection: FactSelection,
}

impl InMemoryFactStore {
    pub fn new(selection: FactSelection) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            selection,
        }
    }

    /// Add a fact and return its id.
    pub async fn add(&self, fact: Fact) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let mut entries = self.entries.write().await;
        entries.push(StoredFact {
            id: id.clone(),
            needle: fact.text.to_lowercase(),
            fact,
            added_at: Utc::now(),
        });
        tracing::debug!(id = %id, total = entries.len(), "Fact stored");
        id
    }

    /// Load a JSON array of facts. A missing file loads nothing.
    pub async fn load_from_path(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Fact file not found; starting empty");
                return Ok(0);
            }
            Err(e) => {
                return Err(Error::storage(format!(
                    "Failed to read fact file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let facts: Vec<Fact> = serde_json::from_str(&content).map_err(|e| {
            Error::storage(format!("Failed to parse fact file {}: {}", path.display(), e))
        })?;

        let count = facts.len();
        for fact in facts {
            self.add(fact).await;
        }
        tracing::info!(path = %path.display(), count, "Facts loaded");
        Ok(count)
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// When the most recent fact was added.
    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.entries.read().await.last().map(|e| e.added_at)
    }
}

impl Default for InMemoryFactStore {
    fn default() -> Self {
        Self::new(FactSelection::default())
    }
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    async fn retrieve_relevant(&self, keywords: &[String]) -> Result<Vec<Fact>> {
        let entries = self.entries.read().await;
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let mut chosen: HashSet<&str> = HashSet::new();
        let mut selected: Vec<Fact> = Vec::new();

        for entry in entries
            .iter()
            .filter(|e| keywords.iter().any(|k| e.needle.contains(k.as_str())))
            .take(self.selection.max_keyword_facts)
        {
            chosen.insert(entry.id.as_str());
            selected.push(entry.fact.clone());
        }

        // Newest first
        for entry in entries
            .iter()
            .rev()
            .filter(|e| !chosen.contains(e.id.as_str()))
            .filter(|e| self.selection.preferred_categories.contains(&e.fact.category))
            .take(self.selection.max_category_facts)
        {
            selected.push(entry.fact.clone());
        }

        selected.truncate(MAX_CONTEXT_FACTS);
        tracing::debug!(selected = selected.len(), "Facts selected");
        Ok(selected)
    }
}
