use crate::{
    errors::PetCareError,
    knowledge::match_label,
    types::{ConditionRecord, ConditionSeed, SeedOutcome},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for the backing store of the condition knowledge base.
///
/// Implementations must be safe to share between concurrent requests. The
/// request path only calls the read methods; seeding happens once at startup
/// or through an administrative command.
#[async_trait]
pub trait KnowledgeStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the store (e.g., "SQLite").
    fn name(&self) -> &str;

    /// Loads every condition record in the store's natural (id) order.
    async fn load(&self) -> Result<Vec<ConditionRecord>, PetCareError>;

    /// Returns the number of stored records.
    async fn count(&self) -> Result<usize, PetCareError>;

    /// Inserts `defaults` only if the store is empty.
    async fn ensure_seeded(&self, defaults: &[ConditionSeed]) -> Result<SeedOutcome, PetCareError>;

    /// Deletes every record and inserts `defaults`, returning the new count.
    async fn reseed(&self, defaults: &[ConditionSeed]) -> Result<usize, PetCareError>;

    /// Returns the records whose image keywords occur inside `label`.
    async fn query_by_label_substring(
        &self,
        label: &str,
    ) -> Result<Vec<ConditionRecord>, PetCareError> {
        let records = self.load().await?;
        Ok(match_label(label, &records))
    }
}

dyn_clone::clone_trait_object!(KnowledgeStore);
