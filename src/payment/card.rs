use crate::domain::money::Amount;
use crate::domain::order::{PaymentMethod, PaymentReference};
use crate::domain::ports::{ChargeRequest, PaymentParams, PaymentProcessor};
use crate::error::PaymentFailure;
use async_trait::async_trait;
use std::sync::Arc;

/// The card network side of a capture. Injected so tests can script
/// declines and faults without a real gateway.
#[async_trait]
pub trait CardGateway: Send + Sync {
    async fn capture(
        &self,
        token: &str,
        amount: Amount,
        idempotency_key: &str,
    ) -> Result<PaymentReference, PaymentFailure>;
}

/// Synchronous capture of a tokenized card.
pub struct CardProcessor {
    gateway: Arc<dyn CardGateway>,
}

impl CardProcessor {
    pub fn new(gateway: Arc<dyn CardGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl PaymentProcessor for CardProcessor {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Card
    }

    async fn charge(
        &self,
        request: ChargeRequest,
        params: PaymentParams,
    ) -> Result<PaymentReference, PaymentFailure> {
        let PaymentParams::Card { token } = params else {
            return Err(PaymentFailure::Fault(
                "card processor received non-card params".to_string(),
            ));
        };
        if token.is_empty() {
            return Err(PaymentFailure::Declined("missing card token".to_string()));
        }

        let key = request.order_id.to_string();
        self.gateway.capture(&token, request.amount, &key).await
    }
}

/// Gateway stand-in for demos and tests. Approves every token except the
/// magic prefixes that trigger a decline or a gateway fault.
#[derive(Default)]
pub struct SandboxCardGateway;

impl SandboxCardGateway {
    pub const DECLINE_PREFIX: &'static str = "decline";
    pub const FAULT_PREFIX: &'static str = "fault";
}

#[async_trait]
impl CardGateway for SandboxCardGateway {
    async fn capture(
        &self,
        token: &str,
        _amount: Amount,
        idempotency_key: &str,
    ) -> Result<PaymentReference, PaymentFailure> {
        if token.starts_with(Self::DECLINE_PREFIX) {
            return Err(PaymentFailure::Declined(
                "card declined by issuer".to_string(),
            ));
        }
        if token.starts_with(Self::FAULT_PREFIX) {
            return Err(PaymentFailure::Fault(
                "simulated gateway outage".to_string(),
            ));
        }
        PaymentReference::new(format!("card-{idempotency_key}"))
            .map_err(|e| PaymentFailure::Fault(e.to_string()))
    }
}
