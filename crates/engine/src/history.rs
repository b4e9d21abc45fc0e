use std::collections::HashMap;
use std::sync::Arc;

use backline_core::ProductId;

/// Read-only view over historical return volumes.
///
/// The pipeline reads this to build the scorer's context; the scorer itself
/// never touches it.
pub trait ReturnHistorySource: Send + Sync {
    /// Mean return quantity previously observed for a product, if any.
    fn average_return_quantity(&self, product_id: &ProductId) -> Option<f64>;
}

impl<H> ReturnHistorySource for Arc<H>
where
    H: ReturnHistorySource + ?Sized,
{
    fn average_return_quantity(&self, product_id: &ProductId) -> Option<f64> {
        (**self).average_return_quantity(product_id)
    }
}

/// In-memory history for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryReturnHistory {
    averages: HashMap<ProductId, f64>,
}

impl InMemoryReturnHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_average(mut self, product_id: ProductId, average: f64) -> Self {
        self.averages.insert(product_id, average);
        self
    }
}

impl ReturnHistorySource for InMemoryReturnHistory {
    fn average_return_quantity(&self, product_id: &ProductId) -> Option<f64> {
        self.averages.get(product_id).copied()
    }
}
