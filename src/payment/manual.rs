use crate::domain::order::{PaymentMethod, PaymentReference};
use crate::domain::ports::{ChargeRequest, PaymentParams, PaymentProcessor};
use crate::error::PaymentFailure;
use async_trait::async_trait;

/// Pay by an instrument outside the system (a mailed check). The
/// registration is accepted on trust and settlement is reconciled out of
/// band, so the charge always succeeds immediately with a placeholder
/// reference derived from the order identity.
#[derive(Default)]
pub struct ManualProcessor;

impl ManualProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProcessor for ManualProcessor {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Manual
    }

    async fn charge(
        &self,
        request: ChargeRequest,
        params: PaymentParams,
    ) -> Result<PaymentReference, PaymentFailure> {
        if !matches!(params, PaymentParams::Manual) {
            return Err(PaymentFailure::Fault(
                "manual processor received non-manual params".to_string(),
            ));
        }
        PaymentReference::new(format!("manual-{}", request.order_id))
            .map_err(|e| PaymentFailure::Fault(e.to_string()))
    }
}
