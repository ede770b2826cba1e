use crate::domain::attempt::{CheckoutAttempt, CheckoutStep};
use crate::domain::order::{DraftOrder, Order, OrderId, PaymentMethod};
use crate::domain::ports::{
    ChargeRequest, NotificationServiceRef, OrderStoreRef, PaymentParams, PaymentProcessorRef,
    ReconciliationQueueRef, ReconciliationRecord,
};
use crate::error::{CheckoutError, PaymentFailure, PersistStage, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinSet;

/// The checkout state machine.
///
/// Drives one order through pending → paid → confirmed against its three
/// collaborators in a fixed protocol: persist the pending snapshot, invoke
/// the processor for the chosen method, persist the final record, fire a
/// receipt. Owns every status transition; the store is the source of truth
/// once a pending snapshot exists.
///
/// The orchestrator never retries on its own. All retries are caller
/// re-invocations with the same [`CheckoutAttempt`], which is why both
/// store writes are idempotent upserts keyed by order identity.
pub struct CheckoutOrchestrator {
    store: OrderStoreRef,
    notifier: NotificationServiceRef,
    reconciliation: ReconciliationQueueRef,
    processors: HashMap<PaymentMethod, PaymentProcessorRef>,
    // Guards below use std::sync::Mutex: critical sections are lookups and
    // inserts, never held across an await.
    in_flight: Mutex<HashSet<OrderId>>,
    // One entry per order finalized by this instance, kept for its life.
    // The store holds the authoritative Confirmed status; this set only
    // short-circuits in-process re-invocations, so a restart loses nothing.
    finalized: Mutex<HashSet<OrderId>>,
    // In-flight receipt dispatches; drained on shutdown so runtime
    // teardown cannot cancel them silently.
    receipt_tasks: TokioMutex<JoinSet<()>>,
}

impl CheckoutOrchestrator {
    pub fn new(
        store: OrderStoreRef,
        notifier: NotificationServiceRef,
        reconciliation: ReconciliationQueueRef,
    ) -> Self {
        Self {
            store,
            notifier,
            reconciliation,
            processors: HashMap::new(),
            in_flight: Mutex::new(HashSet::new()),
            finalized: Mutex::new(HashSet::new()),
            receipt_tasks: TokioMutex::new(JoinSet::new()),
        }
    }

    /// Registers a processor under the method it reports. Last one wins.
    pub fn with_processor(mut self, processor: PaymentProcessorRef) -> Self {
        self.processors.insert(processor.method(), processor);
        self
    }

    /// Runs one orchestration attempt end to end.
    ///
    /// The caller holds the [`CheckoutAttempt`] and passes the same value
    /// on retry so the order identity is reused. Steps run strictly in
    /// order and the first failure short-circuits the rest:
    ///
    /// 1. validate preconditions (no side effects yet)
    /// 2. persist the pending snapshot; no charge is ever attempted for
    ///    an order not durably recorded as pending
    /// 3. charge via the selected processor (may suspend for an external
    ///    approval; abandonment parks the order at pending)
    /// 4. persist the final record; failure here is fatal since the money
    ///    already moved, and is escalated via the reconciliation queue
    /// 5. dispatch the receipt without blocking on it
    pub async fn process_checkout(
        &self,
        attempt: &mut CheckoutAttempt,
        draft: &DraftOrder,
        method: PaymentMethod,
        params: PaymentParams,
    ) -> Result<Order> {
        let order_id = attempt.order_id;

        let already_finalized = self
            .finalized
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&order_id);
        if attempt.is_finalized() || already_finalized {
            return Err(CheckoutError::AlreadyFinalized(order_id));
        }
        // An attempt past the charge step with no final record means the
        // buyer's money already moved. Running the protocol again would
        // charge them twice; this order belongs to reconciliation now.
        if attempt.step == CheckoutStep::Charged {
            return Err(CheckoutError::ChargedButUnrecorded(order_id));
        }

        let amount = draft.amount_due();
        if amount.is_zero() {
            return Err(CheckoutError::Validation(
                "amount due must be greater than zero".to_string(),
            ));
        }
        if params.method() != method {
            return Err(CheckoutError::Validation(format!(
                "payment params are for {}, not {method}",
                params.method()
            )));
        }
        let processor = self
            .processors
            .get(&method)
            .ok_or_else(|| {
                CheckoutError::Validation(format!("no processor registered for {method}"))
            })?
            .clone();

        // Serialize attempts per order identity for the whole protocol.
        let _guard = InFlightGuard::acquire(&self.in_flight, order_id)?;

        let pending = Order::pending(order_id, draft, method, attempt.started_at);
        self.store.save_pending(&pending).await.map_err(|source| {
            CheckoutError::Persistence {
                stage: PersistStage::Pending,
                source,
            }
        })?;
        attempt.step = CheckoutStep::PendingSaved;
        tracing::debug!(%order_id, %amount, %method, "pending order record saved");

        let request = ChargeRequest { order_id, amount };
        let reference = match processor.charge(request, params).await {
            Ok(reference) => reference,
            Err(PaymentFailure::Declined(reason)) => {
                tracing::info!(%order_id, %reason, "payment declined, order remains pending");
                return Err(CheckoutError::PaymentDeclined(reason));
            }
            Err(PaymentFailure::Abandoned) => {
                tracing::info!(%order_id, "payment abandoned, order remains pending");
                return Err(CheckoutError::PaymentAbandoned);
            }
            Err(PaymentFailure::Fault(reason)) => {
                tracing::warn!(%order_id, %reason, "payment processor fault, order remains pending");
                return Err(CheckoutError::PaymentProcessorFault(reason));
            }
        };
        attempt.step = CheckoutStep::Charged;
        tracing::debug!(%order_id, reference = %reference, "charge captured");

        let finalized = pending.into_paid(reference.clone()).into_confirmed();
        if let Err(source) = self.store.save_final(&finalized).await {
            // Money moved but the record did not. Escalate loudly: this is
            // the one failure a resubmission must never repair, because it
            // would charge the buyer a second time.
            tracing::error!(
                %order_id,
                reference = %reference,
                error = %source,
                "final order record not saved after successful charge; queued for reconciliation"
            );
            self.reconciliation
                .push(ReconciliationRecord {
                    order_id,
                    payment_reference: reference,
                    amount,
                    reason: source.to_string(),
                    recorded_at: Utc::now(),
                })
                .await;
            return Err(CheckoutError::Persistence {
                stage: PersistStage::Final,
                source,
            });
        }

        self.dispatch_receipt(&finalized).await;

        self.finalized
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(order_id);
        attempt.step = CheckoutStep::Finalized;
        tracing::info!(%order_id, "checkout complete");
        Ok(finalized)
    }

    /// Fire-and-forget receipt dispatch. Spawned into the tracked task set
    /// so the caller's response never waits on it; failure is logged and
    /// absorbed. [`drain_receipts`](Self::drain_receipts) is the shutdown
    /// hook that keeps runtime teardown from cancelling these mid-flight.
    async fn dispatch_receipt(&self, order: &Order) {
        let notifier = Arc::clone(&self.notifier);
        let order = order.clone();
        let mut tasks = self.receipt_tasks.lock().await;
        // Reap dispatches that already finished so the set stays small.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            if let Err(e) = notifier.send_receipt(&order).await {
                tracing::warn!(order_id = %order.id, error = %e, "receipt dispatch failed");
            }
        });
    }

    /// Awaits every in-flight receipt dispatch. Call before dropping the
    /// runtime; a receipt lost to process exit would otherwise vanish
    /// without a log line.
    pub async fn drain_receipts(&self) {
        let mut tasks = self.receipt_tasks.lock().await;
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "receipt dispatch task failed to complete");
            }
        }
    }
}

/// RAII membership in the in-flight set: one attempt per order identity at
/// a time.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<OrderId>>,
    order_id: OrderId,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<OrderId>>, order_id: OrderId) -> Result<Self> {
        let mut in_flight = set.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(order_id) {
            return Err(CheckoutError::AttemptInProgress(order_id));
        }
        Ok(Self { set, order_id })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.order_id);
    }
}
