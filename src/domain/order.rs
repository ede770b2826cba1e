use crate::domain::money::Amount;
use crate::error::CheckoutError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable order identity. Assigned once per checkout attempt and reused
/// across retries, so the store sees the same key every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The reference handed back by a payment processor once money moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReference(String);

impl PaymentReference {
    pub fn new(value: impl Into<String>) -> Result<Self, CheckoutError> {
        let value = value.into();
        if value.is_empty() {
            return Err(CheckoutError::Validation(
                "payment reference must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of supported payment methods. Adding a method means
/// adding a variant here and a conforming processor, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Wallet,
    Manual,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Wallet => write!(f, "wallet"),
            PaymentMethod::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Pending,
    Paid,
    Confirmed,
}

/// One registered attendee on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub email: String,
}

/// An order as assembled by the upstream registration form: participants
/// plus the confirmed money amounts. No identity or status yet; those are
/// assigned when a checkout attempt starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOrder {
    pub participants: Vec<Participant>,
    pub total: Amount,
    pub fees: Amount,
}

impl DraftOrder {
    /// The exact amount the processor will be asked to capture.
    pub fn amount_due(&self) -> Amount {
        self.total + self.fees
    }
}

/// The central entity: a registration order with its payment state.
///
/// Status only moves forward (new → pending → paid → confirmed); the one
/// sanctioned backward transition is [`Order::reset_to_new`], used when a
/// buyer backs out of checkout before any money moved. The payment
/// reference is present exactly when status is `Paid` or later, which the
/// transition methods enforce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub participants: Vec<Participant>,
    pub total: Amount,
    pub fees: Amount,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<PaymentReference>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Derives the pending snapshot written to the store before any charge
    /// is attempted. `created_at` is the attempt's start time, not the
    /// write time, so a retry upsert leaves it untouched.
    pub fn pending(
        id: OrderId,
        draft: &DraftOrder,
        payment_method: PaymentMethod,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            participants: draft.participants.clone(),
            total: draft.total,
            fees: draft.fees,
            payment_method,
            payment_reference: None,
            status: OrderStatus::Pending,
            created_at,
            finalized_at: None,
        }
    }

    /// Merges a successful charge into the order.
    pub fn into_paid(mut self, reference: PaymentReference) -> Self {
        self.payment_reference = Some(reference);
        self.status = OrderStatus::Paid;
        self
    }

    /// Marks the order complete and stamps the finalize time.
    pub fn into_confirmed(mut self) -> Self {
        self.status = OrderStatus::Confirmed;
        self.finalized_at = Some(Utc::now());
        self
    }

    /// Operator-initiated reset for a buyer who aborted checkout and came
    /// back. Only legal while no money has moved.
    pub fn reset_to_new(&mut self) -> Result<(), CheckoutError> {
        match self.status {
            OrderStatus::New | OrderStatus::Pending => {
                self.status = OrderStatus::New;
                Ok(())
            }
            OrderStatus::Paid | OrderStatus::Confirmed => Err(CheckoutError::Validation(
                format!("cannot reset order {}: payment already captured", self.id),
            )),
        }
    }

    pub fn amount_due(&self) -> Amount {
        self.total + self.fees
    }
}
