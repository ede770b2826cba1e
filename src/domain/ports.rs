use crate::domain::money::Amount;
use crate::domain::order::{Order, OrderId, PaymentMethod, PaymentReference};
use crate::error::{NotificationError, PaymentFailure, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Durable key-value persistence for orders, keyed by order identity.
///
/// Both writes are idempotent upserts: calling either twice with the same
/// payload leaves the same stored record as calling it once, never a
/// duplicate. The orchestrator treats both as synchronous blocking calls
/// that may fail; no partial-write state is exposed.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes the pending snapshot, before any charge is attempted.
    async fn save_pending(&self, order: &Order) -> Result<(), StoreError>;
    /// Writes the authoritative final record, overwriting the pending
    /// snapshot at the same identity.
    async fn save_final(&self, order: &Order) -> Result<(), StoreError>;
}

/// What the orchestrator hands a processor: the identity being charged and
/// the exact amount due. The identity doubles as the processor-side
/// idempotency key.
#[derive(Debug, Clone, Copy)]
pub struct ChargeRequest {
    pub order_id: OrderId,
    pub amount: Amount,
}

/// Outcome of an external wallet approval step, delivered over the channel
/// carried in [`PaymentParams::Wallet`].
#[derive(Debug)]
pub enum WalletApproval {
    Approved(PaymentReference),
    Abandoned,
}

/// Variant-specific credentials for one charge call. Consumed by the
/// matching processor; a mismatch with the chosen method is a caller bug.
#[derive(Debug)]
pub enum PaymentParams {
    /// Tokenized card to capture synchronously.
    Card { token: String },
    /// Receiver for the external approval the wallet UI drives. A dropped
    /// sender counts as abandonment.
    Wallet {
        approval: oneshot::Receiver<WalletApproval>,
    },
    /// No credentials; payment settles out of band.
    Manual,
}

impl PaymentParams {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentParams::Card { .. } => PaymentMethod::Card,
            PaymentParams::Wallet { .. } => PaymentMethod::Wallet,
            PaymentParams::Manual => PaymentMethod::Manual,
        }
    }
}

/// Executes a charge for a given amount and returns a payment reference or
/// a definitive failure. The three variants are interchangeable to the
/// orchestrator; they differ only in how they fulfill the call.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// The method this processor serves, used for registry lookup.
    fn method(&self) -> PaymentMethod;

    /// May suspend for an external round trip (wallet approval); card and
    /// manual capture synchronously.
    async fn charge(
        &self,
        request: ChargeRequest,
        params: PaymentParams,
    ) -> Result<PaymentReference, PaymentFailure>;
}

/// Best-effort dispatcher of post-purchase receipts. Invoked without
/// awaiting the result inside the checkout success path; failures are
/// logged, never propagated.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_receipt(&self, order: &Order) -> Result<(), NotificationError>;
}

/// A charged-but-unrecorded order, queued for manual reconciliation
/// against the processor's own ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    pub order_id: OrderId,
    pub payment_reference: PaymentReference,
    pub amount: Amount,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// Sink for reconciliation records. Must never lose a record silently;
/// an operator drains it out of band.
#[async_trait]
pub trait ReconciliationQueue: Send + Sync {
    async fn push(&self, record: ReconciliationRecord);
}

pub type OrderStoreRef = Arc<dyn OrderStore>;
pub type PaymentProcessorRef = Arc<dyn PaymentProcessor>;
pub type NotificationServiceRef = Arc<dyn NotificationService>;
pub type ReconciliationQueueRef = Arc<dyn ReconciliationQueue>;
