use crate::domain::order::{Order, OrderId};
use crate::domain::ports::OrderStore;
use crate::error::StoreError;
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing order records.
pub const CF_ORDERS: &str = "orders";

/// A persistent order store backed by RocksDB.
///
/// Orders are stored as JSON under their identity in a dedicated column
/// family. Pending and final writes land at the same key, so the final
/// record simply overwrites the pending snapshot and repeated writes are
/// idempotent.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbOrderStore {
    db: Arc<DB>,
}

impl RocksDbOrderStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the "orders" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders])
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn put(&self, order: &Order) -> Result<(), StoreError> {
        let cf = self
            .db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| StoreError::Unavailable("orders column family not found".to_string()))?;
        let key = order.id.as_uuid().into_bytes();
        let value =
            serde_json::to_vec(order).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    pub fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let cf = self
            .db
            .cf_handle(CF_ORDERS)
            .ok_or_else(|| StoreError::Unavailable("orders column family not found".to_string()))?;
        let key = id.as_uuid().into_bytes();
        let result = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        match result {
            Some(bytes) => {
                let order = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderStore for RocksDbOrderStore {
    async fn save_pending(&self, order: &Order) -> Result<(), StoreError> {
        self.put(order)
    }

    async fn save_final(&self, order: &Order) -> Result<(), StoreError> {
        self.put(order)
    }
}
