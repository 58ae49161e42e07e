//! Sentinel party resolution.
//!
//! Delivered checkout orders are reassigned to a shared sentinel party
//! named "Order". The sentinel is looked up by exact name and created on
//! first use; the unique constraint on party names arbitrates concurrent
//! creation, so a loser of the race retries the lookup instead of failing.

use domain::Party;
use store::{PartyStore, StoreError};

use crate::error::{FulfillmentError, Result};

/// Exact name of the sentinel party.
pub const SENTINEL_NAME: &str = "Order";

/// Email of the account backing the sentinel party.
pub const SENTINEL_EMAIL: &str = "order@storefront.local";

const MAX_ATTEMPTS: u32 = 3;

/// Resolves the sentinel party, creating it on first use.
pub struct SentinelResolver;

impl SentinelResolver {
    /// Finds the sentinel party by exact name, or creates it together with
    /// its backing account.
    ///
    /// A unique violation during creation means another resolver won the
    /// race; the lookup is retried so both callers converge on the same
    /// party. Gives up after a bounded number of attempts.
    pub async fn resolve<S>(store: &S) -> Result<Party>
    where
        S: PartyStore + ?Sized,
    {
        for _ in 0..MAX_ATTEMPTS {
            if let Some(party) = store.find_party_by_name(SENTINEL_NAME).await? {
                return Ok(party);
            }

            match store
                .create_party_with_account(SENTINEL_NAME, SENTINEL_EMAIL)
                .await
            {
                Ok(party) => return Ok(party),
                Err(StoreError::UniqueViolation { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(FulfillmentError::SentinelResolutionFailed {
            attempts: MAX_ATTEMPTS,
        })
    }
}
