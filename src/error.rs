use crate::domain::order::OrderId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Which durable write failed. The distinction matters: a failed pending
/// write happens before any money moves, a failed final write happens after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStage {
    Pending,
    Final,
}

impl std::fmt::Display for PersistStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistStage::Pending => write!(f, "pending"),
            PersistStage::Final => write!(f, "final"),
        }
    }
}

/// Failure reported by an [`OrderStore`](crate::domain::ports::OrderStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by a payment processor's `charge` call.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PaymentFailure {
    /// The processor gave a definitive no. Retrying with the same
    /// instrument will not help; a different method might.
    #[error("payment declined: {0}")]
    Declined(String),
    /// The buyer never completed the external approval step.
    #[error("payment abandoned before approval")]
    Abandoned,
    /// The processor call itself errored (network, gateway outage).
    #[error("payment processor fault: {0}")]
    Fault(String),
}

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("receipt dispatch failed: {0}")]
    Dispatch(String),
}

/// Everything `process_checkout` can report back to the caller.
#[derive(Error, Debug)]
pub enum CheckoutError {
    /// Precondition violation. No side effects occurred.
    #[error("validation failed: {0}")]
    Validation(String),
    /// A durable write failed. `stage` tells the caller whether money
    /// moved: `Pending` means no charge was attempted, `Final` means the
    /// charge succeeded but the record was not updated.
    #[error("could not save {stage} order record: {source}")]
    Persistence {
        stage: PersistStage,
        source: StoreError,
    },
    #[error("payment declined: {0}")]
    PaymentDeclined(String),
    /// The buyer walked away mid-approval. The order stays pending and the
    /// caller may retry.
    #[error("payment abandoned; order remains pending")]
    PaymentAbandoned,
    #[error("payment processor fault: {0}")]
    PaymentProcessorFault(String),
    /// Re-invocation after a final success for the same order identity.
    #[error("order {0} is already finalized")]
    AlreadyFinalized(OrderId),
    /// Re-invocation of an attempt whose charge already succeeded but whose
    /// final record was never written. Running the protocol again would
    /// charge the buyer a second time; the order must go through
    /// reconciliation instead.
    #[error("order {0} was charged but not recorded; resubmission refused, reconcile manually")]
    ChargedButUnrecorded(OrderId),
    /// Another attempt for the same order identity is currently in flight.
    #[error("checkout for order {0} is already in progress")]
    AttemptInProgress(OrderId),
}

impl CheckoutError {
    /// Whether the caller may recover by re-invoking `process_checkout`
    /// with the same attempt (possibly a different payment method).
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Persistence {
                stage: PersistStage::Pending,
                ..
            } => true,
            CheckoutError::PaymentDeclined(_)
            | CheckoutError::PaymentAbandoned
            | CheckoutError::PaymentProcessorFault(_) => true,
            CheckoutError::Validation(_) => false,
            CheckoutError::Persistence {
                stage: PersistStage::Final,
                ..
            } => false,
            CheckoutError::AlreadyFinalized(_)
            | CheckoutError::ChargedButUnrecorded(_)
            | CheckoutError::AttemptInProgress(_) => false,
        }
    }

    /// The unrecoverable-by-retry cases: money moved but the final record
    /// was not written. Requires manual reconciliation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CheckoutError::Persistence {
                stage: PersistStage::Final,
                ..
            } | CheckoutError::ChargedButUnrecorded(_)
        )
    }
}
