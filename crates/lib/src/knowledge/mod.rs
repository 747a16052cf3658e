//! # Condition Knowledge Base
//!
//! The static reference table of known conditions and the keyword matcher that
//! searches it. The table itself lives behind the [`KnowledgeStore`] trait; this
//! module adds an in-memory snapshot implementation that the server loads once
//! at startup and shares read-only between requests.

pub mod matcher;
pub mod seed;

pub use matcher::match_label;
pub use seed::DEFAULT_CONDITIONS;

use crate::{
    errors::PetCareError,
    providers::db::storage::KnowledgeStore,
    types::{ConditionRecord, ConditionSeed, SeedOutcome},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory knowledge base.
///
/// Clones share the same records. Writes only happen through the seeding
/// methods; the request path only ever reads.
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledgeBase {
    records: Arc<RwLock<Vec<ConditionRecord>>>,
}

impl StaticKnowledgeBase {
    /// Creates an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already loaded set of records, e.g. a snapshot of the SQLite table.
    pub fn from_records(records: Vec<ConditionRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Loads a snapshot from any other store.
    pub async fn snapshot_of(store: &dyn KnowledgeStore) -> Result<Self, PetCareError> {
        Ok(Self::from_records(store.load().await?))
    }
}

fn records_from_seeds(seeds: &[ConditionSeed], first_id: i64) -> Vec<ConditionRecord> {
    seeds
        .iter()
        .zip(first_id..)
        .map(|(seed, id)| ConditionRecord {
            id,
            disease_name: seed.disease_name.to_string(),
            image_labels: seed.image_labels.to_string(),
            text_symptoms: seed.text_symptoms.to_string(),
            warning_level: seed.warning_level.to_string(),
            advice: seed.advice.to_string(),
        })
        .collect()
}

#[async_trait]
impl KnowledgeStore for StaticKnowledgeBase {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn load(&self) -> Result<Vec<ConditionRecord>, PetCareError> {
        Ok(self.records.read().await.clone())
    }

    async fn count(&self) -> Result<usize, PetCareError> {
        Ok(self.records.read().await.len())
    }

    async fn ensure_seeded(&self, defaults: &[ConditionSeed]) -> Result<SeedOutcome, PetCareError> {
        let mut records = self.records.write().await;
        if !records.is_empty() {
            return Ok(SeedOutcome::AlreadyPresent(records.len()));
        }
        *records = records_from_seeds(defaults, 1);
        Ok(SeedOutcome::Seeded(records.len()))
    }

    async fn reseed(&self, defaults: &[ConditionSeed]) -> Result<usize, PetCareError> {
        let mut records = self.records.write().await;
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        *records = records_from_seeds(defaults, next_id);
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_seeded_is_idempotent() {
        let kb = StaticKnowledgeBase::new();
        assert_eq!(
            kb.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap(),
            SeedOutcome::Seeded(4)
        );
        assert_eq!(
            kb.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap(),
            SeedOutcome::AlreadyPresent(4)
        );
        assert_eq!(kb.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn query_by_label_substring_uses_seeded_records() {
        let kb = StaticKnowledgeBase::new();
        kb.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();

        let matched = kb
            .query_by_label_substring("왼쪽 눈에 눈곱이 끼어 있음")
            .await
            .unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].disease_name, "결막염 (의심)");
    }

    #[tokio::test]
    async fn reseed_replaces_records_with_fresh_ids() {
        let kb = StaticKnowledgeBase::new();
        kb.ensure_seeded(DEFAULT_CONDITIONS).await.unwrap();
        let count = kb.reseed(&DEFAULT_CONDITIONS[..2]).await.unwrap();
        assert_eq!(count, 2);
        let ids: Vec<i64> = kb.load().await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 6]);
    }
}
