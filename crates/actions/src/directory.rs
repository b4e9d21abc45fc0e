use std::collections::HashMap;
use std::sync::Arc;

use backline_core::ProductId;

/// Read-only view over the order and restock tables of the data source.
///
/// The reply composer answers from this; it never writes.
pub trait StatusDirectory: Send + Sync {
    /// Current status of an order, if the order exists.
    fn order_status(&self, order_id: u64) -> Option<String>;

    /// Quantity of a pending restock for a product, if one is scheduled.
    fn pending_restock(&self, product_id: &ProductId) -> Option<u32>;
}

impl<D> StatusDirectory for Arc<D>
where
    D: StatusDirectory + ?Sized,
{
    fn order_status(&self, order_id: u64) -> Option<String> {
        (**self).order_status(order_id)
    }

    fn pending_restock(&self, product_id: &ProductId) -> Option<u32> {
        (**self).pending_restock(product_id)
    }
}

/// In-memory directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    orders: HashMap<u64, String>,
    restocks: HashMap<ProductId, u32>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order_id: u64, status: impl Into<String>) -> Self {
        self.orders.insert(order_id, status.into());
        self
    }

    pub fn with_restock(mut self, product_id: ProductId, quantity: u32) -> Self {
        self.restocks.insert(product_id, quantity);
        self
    }
}

impl StatusDirectory for InMemoryDirectory {
    fn order_status(&self, order_id: u64) -> Option<String> {
        self.orders.get(&order_id).cloned()
    }

    fn pending_restock(&self, product_id: &ProductId) -> Option<u32> {
        self.restocks.get(product_id).copied()
    }
}
