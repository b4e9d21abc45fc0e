use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backline_core::{DecisionId, ProductId};

/// A restock request record, handed to the persistence layer to store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockRequest {
    pub product_id: ProductId,
    pub restock_quantity: u32,
    pub decision_id: DecisionId,
    pub created_at: DateTime<Utc>,
}

/// Restock quantity for a returned quantity under the replenishment factor.
///
/// Rounds up, so a fractional factor never under-restocks by truncation.
pub fn restock_quantity(return_quantity: u32, replenishment_factor: f64) -> u32 {
    (f64::from(return_quantity) * replenishment_factor).ceil() as u32
}
