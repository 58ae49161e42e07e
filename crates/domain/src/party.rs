//! Party records.

use common::PartyId;
use serde::{Deserialize, Serialize};

/// A party an order can be billed against.
///
/// Party names are unique system-wide; the sentinel bookkeeping party
/// relies on that constraint for its lookup-or-create resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub is_active: bool,
}
