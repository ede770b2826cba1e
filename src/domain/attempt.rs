use crate::domain::order::OrderId;
use chrono::{DateTime, Utc};

/// How far an orchestration attempt got. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    Draft,
    PendingSaved,
    Charged,
    Finalized,
}

/// One logical order's progress through checkout, held by the caller.
///
/// The caller constructs one attempt per order and passes the same value on
/// every retry, so the order identity stays stable and the store sees
/// idempotent upserts instead of duplicates. This replaces any notion of
/// process-wide "current step" state.
#[derive(Debug, Clone)]
pub struct CheckoutAttempt {
    pub order_id: OrderId,
    pub step: CheckoutStep,
    /// When this logical order first entered checkout. Pending snapshots
    /// written on retry reuse it, so the stored creation time never moves.
    pub started_at: DateTime<Utc>,
}

impl CheckoutAttempt {
    pub fn new() -> Self {
        Self {
            order_id: OrderId::new(),
            step: CheckoutStep::Draft,
            started_at: Utc::now(),
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.step == CheckoutStep::Finalized
    }
}

impl Default for CheckoutAttempt {
    fn default() -> Self {
        Self::new()
    }
}
