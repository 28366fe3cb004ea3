/// Domain entities for asynchronous checkout jobs
///
/// A checkout job represents one in-flight submission of a cart to a payment
/// gateway. Failed executions are retried on a fixed backoff schedule until
/// the schedule is exhausted or the job ages out of the retention window.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Job status; `succeeded`, `failed` and `expired` are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutJobStatus {
    Pending,
    Succeeded,
    Failed,
    Expired,
}

impl CheckoutJobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CheckoutJobStatus::Pending)
    }
}

impl std::fmt::Display for CheckoutJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutJobStatus::Pending => write!(f, "pending"),
            CheckoutJobStatus::Succeeded => write!(f, "succeeded"),
            CheckoutJobStatus::Failed => write!(f, "failed"),
            CheckoutJobStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for CheckoutJobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CheckoutJobStatus::Pending),
            "succeeded" => Ok(CheckoutJobStatus::Succeeded),
            "failed" => Ok(CheckoutJobStatus::Failed),
            "expired" => Ok(CheckoutJobStatus::Expired),
            _ => Err(format!("Invalid checkout job status: {}", s)),
        }
    }
}

/// New job to be queued (before insertion to database)
#[derive(Debug, Clone)]
pub struct NewCheckoutJob {
    pub cart_uuid: String,
    pub payment_gateway: String,
    pub payment_method: String,
    pub payload: serde_json::Value,
}

impl NewCheckoutJob {
    pub fn new(
        payment_gateway: impl Into<String>,
        payment_method: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            cart_uuid: Uuid::new_v4().to_string(),
            payment_gateway: payment_gateway.into(),
            payment_method: payment_method.into(),
            payload,
        }
    }
}

/// Checkout job record from database (with execution metadata)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutJob {
    pub cart_uuid: String,
    pub payment_gateway: String,
    pub payment_method: String,
    pub payload: serde_json::Value,
    pub status: CheckoutJobStatus,
    pub attempts: i32,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckoutJob {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
