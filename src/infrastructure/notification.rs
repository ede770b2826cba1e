use crate::domain::order::Order;
use crate::domain::ports::NotificationService;
use crate::error::NotificationError;
use async_trait::async_trait;

/// Receipt dispatch that just logs. Stands in for the real email sender;
/// the orchestration contract only cares that dispatch is best-effort.
pub struct LogNotificationService;

#[async_trait]
impl NotificationService for LogNotificationService {
    async fn send_receipt(&self, order: &Order) -> Result<(), NotificationError> {
        let recipients: Vec<&str> = order
            .participants
            .iter()
            .map(|p| p.email.as_str())
            .collect();
        tracing::info!(
            order_id = %order.id,
            ?recipients,
            amount = %order.amount_due(),
            "receipt dispatched"
        );
        Ok(())
    }
}
