//! Party store contract.

use async_trait::async_trait;
use common::PartyId;
use domain::Party;

use crate::Result;

/// Persistence for parties and their backing accounts.
///
/// Party names and account emails are unique. Creation surfaces
/// [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation) on
/// conflict instead of trusting a prior "not found" read; the sentinel
/// resolver leans on that to stay race-free.
#[async_trait]
pub trait PartyStore: Send + Sync {
    /// Looks a party up by its exact name.
    async fn find_party_by_name(&self, name: &str) -> Result<Option<Party>>;

    /// Creates a party and its backing account atomically.
    async fn create_party_with_account(&self, name: &str, email: &str) -> Result<Party>;

    /// Loads a party by id.
    async fn get_party(&self, party_id: PartyId) -> Result<Option<Party>>;
}
