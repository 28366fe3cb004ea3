/// Value objects for the checkout jobs domain
use serde::{Deserialize, Serialize};

/// Checkout job status enum matching database type
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::CheckoutJobStatus"]
#[serde(rename_all = "lowercase")]
pub enum CheckoutJobStatusDb {
    Pending,
    Succeeded,
    Failed,
    Expired,
}

impl std::fmt::Display for CheckoutJobStatusDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckoutJobStatusDb::Pending => write!(f, "pending"),
            CheckoutJobStatusDb::Succeeded => write!(f, "succeeded"),
            CheckoutJobStatusDb::Failed => write!(f, "failed"),
            CheckoutJobStatusDb::Expired => write!(f, "expired"),
        }
    }
}
