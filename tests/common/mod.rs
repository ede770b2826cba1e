//! Shared test doubles for the orchestration scenarios.

#![allow(dead_code)]

use async_trait::async_trait;
use regpay::domain::money::Amount;
use regpay::domain::order::{DraftOrder, Order, OrderId, PaymentMethod, Participant, PaymentReference};
use regpay::domain::ports::{
    ChargeRequest, NotificationService, OrderStore, PaymentParams, PaymentProcessor,
};
use regpay::error::{NotificationError, PaymentFailure, StoreError};
use regpay::infrastructure::in_memory::InMemoryOrderStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

pub fn draft(total: Decimal, fees: Decimal) -> DraftOrder {
    DraftOrder {
        participants: vec![Participant {
            name: "Test Attendee".to_string(),
            email: "attendee@example.com".to_string(),
        }],
        total: Amount::new(total).unwrap(),
        fees: Amount::new(fees).unwrap(),
    }
}

/// An order store whose pending/final writes can be made to fail on
/// demand, backed by a real in-memory store otherwise.
#[derive(Default)]
pub struct FlakyOrderStore {
    inner: InMemoryOrderStore,
    fail_pending: AtomicBool,
    fail_final: AtomicBool,
}

impl FlakyOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_pending(&self, fail: bool) {
        self.fail_pending.store(fail, Ordering::SeqCst);
    }

    pub fn fail_final(&self, fail: bool) {
        self.fail_final.store(fail, Ordering::SeqCst);
    }

    pub async fn get(&self, id: OrderId) -> Option<Order> {
        self.inner.get(id).await
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl OrderStore for FlakyOrderStore {
    async fn save_pending(&self, order: &Order) -> Result<(), StoreError> {
        if self.fail_pending.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.inner.save_pending(order).await
    }

    async fn save_final(&self, order: &Order) -> Result<(), StoreError> {
        if self.fail_final.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.inner.save_final(order).await
    }
}

/// Wraps a processor and counts `charge` invocations, for the
/// at-most-one-charge and charge-ordering assertions.
pub struct CountingProcessor {
    inner: Arc<dyn PaymentProcessor>,
    calls: AtomicUsize,
}

impl CountingProcessor {
    pub fn new(inner: Arc<dyn PaymentProcessor>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProcessor for CountingProcessor {
    fn method(&self) -> PaymentMethod {
        self.inner.method()
    }

    async fn charge(
        &self,
        request: ChargeRequest,
        params: PaymentParams,
    ) -> Result<PaymentReference, PaymentFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.charge(request, params).await
    }
}

/// Records dispatched receipts instead of sending anything. An optional
/// delay simulates a slow email backend.
#[derive(Default)]
pub struct RecordingNotificationService {
    receipts: RwLock<Vec<OrderId>>,
    delay: Option<Duration>,
}

impl RecordingNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            receipts: RwLock::new(Vec::new()),
            delay: Some(delay),
        }
    }

    pub async fn receipt_count(&self) -> usize {
        self.receipts.read().await.len()
    }
}

#[async_trait]
impl NotificationService for RecordingNotificationService {
    async fn send_receipt(&self, order: &Order) -> Result<(), NotificationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.receipts.write().await.push(order.id);
        Ok(())
    }
}

/// A notifier whose dispatch always fails, for asserting that receipt
/// failures never surface as checkout failures.
#[derive(Default)]
pub struct FailingNotificationService {
    attempts: AtomicUsize,
}

impl FailingNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationService for FailingNotificationService {
    async fn send_receipt(&self, _order: &Order) -> Result<(), NotificationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotificationError::Dispatch(
            "smtp relay unreachable".to_string(),
        ))
    }
}
