/// Port for the payment gateway collaborator driven by the worker
///
/// Concrete gateway clients live outside this crate; the worker only needs
/// "run this checkout, tell me the resulting order".
use crate::modules::checkout::domain::entities::CheckoutJob;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Result of a successful checkout execution
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order_id: String,
    pub gateway_payment_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutExecutor: Send + Sync {
    /// Submit the job's cart to its payment gateway
    async fn execute(&self, job: &CheckoutJob) -> AppResult<CheckoutOutcome>;
}
