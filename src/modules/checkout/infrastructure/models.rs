/// Diesel models for the checkout_jobs table
use crate::modules::checkout::domain::entities::{CheckoutJob, CheckoutJobStatus, NewCheckoutJob};
use crate::modules::checkout::domain::value_objects::CheckoutJobStatusDb;
use crate::schema::checkout_jobs;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value as JsonValue;

/// Diesel model for inserting new checkout jobs; status, attempts and
/// timestamps come from column defaults
#[derive(Insertable, Debug)]
#[diesel(table_name = checkout_jobs)]
pub struct NewCheckoutJobRow {
    pub cart_uuid: String,
    pub payment_gateway: String,
    pub payment_method: String,
    pub payload: JsonValue,
}

impl From<NewCheckoutJob> for NewCheckoutJobRow {
    fn from(job: NewCheckoutJob) -> Self {
        Self {
            cart_uuid: job.cart_uuid,
            payment_gateway: job.payment_gateway,
            payment_method: job.payment_method,
            payload: job.payload,
        }
    }
}

/// Diesel model for querying existing checkout jobs
#[derive(Queryable, Selectable, QueryableByName, Debug, Clone)]
#[diesel(table_name = checkout_jobs)]
pub struct CheckoutJobModel {
    pub cart_uuid: String,
    pub payment_gateway: String,
    pub payment_method: String,
    pub payload: JsonValue,
    pub status: CheckoutJobStatusDb,
    pub attempts: i32,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CheckoutJobModel {
    /// Convert to the domain job
    pub fn into_job(self) -> CheckoutJob {
        CheckoutJob {
            cart_uuid: self.cart_uuid,
            payment_gateway: self.payment_gateway,
            payment_method: self.payment_method,
            payload: self.payload,
            status: match self.status {
                CheckoutJobStatusDb::Pending => CheckoutJobStatus::Pending,
                CheckoutJobStatusDb::Succeeded => CheckoutJobStatus::Succeeded,
                CheckoutJobStatusDb::Failed => CheckoutJobStatus::Failed,
                CheckoutJobStatusDb::Expired => CheckoutJobStatus::Expired,
            },
            attempts: self.attempts,
            next_run_at: self.next_run_at,
            last_run_at: self.last_run_at,
            last_error: self.last_error,
            order_id: self.order_id,
            gateway_payment_id: self.gateway_payment_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
