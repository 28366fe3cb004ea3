/// Repository trait for checkout job persistence
///
/// Implementation uses Diesel ORM with PostgreSQL. Claiming a due job must be
/// atomic across concurrent workers (row-level locking), so a job is never
/// executed twice for the same scheduled run.
use crate::modules::checkout::domain::entities::{CheckoutJob, NewCheckoutJob};
use crate::shared::errors::AppResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutJobRepository: Send + Sync {
    /// Enqueue a new checkout job
    async fn enqueue(&self, job: NewCheckoutJob) -> AppResult<CheckoutJob>;

    /// Get job by cart key
    async fn find_by_cart(&self, cart_uuid: &str) -> AppResult<Option<CheckoutJob>>;

    /// Atomically claim the next due pending job (SELECT FOR UPDATE SKIP
    /// LOCKED); stamps `last_run_at` and clears `next_run_at`.
    /// Returns None if no jobs are due.
    async fn claim_due(&self, now: DateTime<Utc>) -> AppResult<Option<CheckoutJob>>;

    /// Terminal success: record the order and gateway payment ids
    async fn mark_succeeded(
        &self,
        cart_uuid: &str,
        order_id: &str,
        gateway_payment_id: &str,
    ) -> AppResult<()>;

    /// Failed execution with retry budget left: increment attempts and
    /// schedule the next run
    async fn reschedule(
        &self,
        cart_uuid: &str,
        error: &str,
        next_run_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Failed execution with retries exhausted: terminal failed state
    async fn mark_failed(&self, cart_uuid: &str, error: &str) -> AppResult<()>;

    /// Mark every non-terminal job last touched before `cutoff` as expired;
    /// returns the number of jobs expired
    async fn expire_stale(&self, cutoff: DateTime<Utc>) -> AppResult<usize>;

    /// Delete expired jobs last touched before `cutoff` (cleanup)
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> AppResult<usize>;

    /// Get queue statistics
    async fn statistics(&self) -> AppResult<CheckoutQueueStatistics>;
}

/// Checkout queue statistics
#[derive(Debug, Clone)]
pub struct CheckoutQueueStatistics {
    pub pending_count: i64,
    pub succeeded_count: i64,
    pub failed_count: i64,
    pub expired_count: i64,
    pub total_count: i64,
}
