use crate::domain::order::{PaymentMethod, PaymentReference};
use crate::domain::ports::{ChargeRequest, PaymentParams, PaymentProcessor, WalletApproval};
use crate::error::PaymentFailure;
use async_trait::async_trait;

/// Wallet payments complete out of band: the buyer approves (or walks away
/// from) an external widget the UI drives. `charge` suspends on the
/// approval channel carried in the params and resolves only when the UI
/// delivers an outcome or drops the sender.
///
/// The UI must not invoke `charge` more than once per displayed approval
/// widget; that is the caller's contract, not enforced here.
#[derive(Default)]
pub struct WalletProcessor;

impl WalletProcessor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProcessor for WalletProcessor {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Wallet
    }

    async fn charge(
        &self,
        request: ChargeRequest,
        params: PaymentParams,
    ) -> Result<PaymentReference, PaymentFailure> {
        let PaymentParams::Wallet { approval } = params else {
            return Err(PaymentFailure::Fault(
                "wallet processor received non-wallet params".to_string(),
            ));
        };

        tracing::debug!(order_id = %request.order_id, "awaiting wallet approval");
        match approval.await {
            Ok(WalletApproval::Approved(reference)) => Ok(reference),
            // Explicit abandonment and a dropped sender both mean the buyer
            // never completed the approval step.
            Ok(WalletApproval::Abandoned) | Err(_) => Err(PaymentFailure::Abandoned),
        }
    }
}
