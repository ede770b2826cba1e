use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{OrderStore, ReconciliationQueue, ReconciliationRecord};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order store.
///
/// Uses `Arc<RwLock<HashMap<OrderId, Order>>>` for shared concurrent
/// access. Both writes are plain inserts keyed by order identity, which
/// makes them idempotent upserts for free. Ideal for tests and the demo
/// driver; swap in the RocksDB store for real durability.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: OrderId) -> Option<Order> {
        let orders = self.orders.read().await;
        orders.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        let orders = self.orders.read().await;
        orders.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn save_pending(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn save_final(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order.clone());
        Ok(())
    }
}

/// In-memory reconciliation sink. Operators (or tests) drain it to find
/// orders that were charged but never recorded as final.
#[derive(Default, Clone)]
pub struct InMemoryReconciliationQueue {
    records: Arc<RwLock<Vec<ReconciliationRecord>>>,
}

impl InMemoryReconciliationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let records = self.records.read().await;
        records.len()
    }

    pub async fn drain(&self) -> Vec<ReconciliationRecord> {
        let mut records = self.records.write().await;
        std::mem::take(&mut *records)
    }
}

#[async_trait]
impl ReconciliationQueue for InMemoryReconciliationQueue {
    async fn push(&self, record: ReconciliationRecord) {
        let mut records = self.records.write().await;
        records.push(record);
    }
}
