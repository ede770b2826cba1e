//! Concrete adapters for the domain ports: in-memory and RocksDB order
//! stores, receipt dispatch, reconciliation queue.

pub mod in_memory;
pub mod notification;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
