/// Checkout jobs bounded context
///
/// Provides a PostgreSQL-backed queue for asynchronous checkout attempts.
/// Failed executions retry on a fixed escalating backoff schedule (5, 10,
/// 20 minutes); jobs stalled past the retention window are swept to expired.
///
/// Architecture:
/// - Domain: entities, retry/expiry policy, repository and gateway traits
/// - Infrastructure: Diesel-based repository implementation
/// - Worker: background worker and expiry sweeper
pub mod domain;
pub mod infrastructure;
pub mod worker;

// Re-exports for easy access
pub use domain::{
    CheckoutExecutor, CheckoutJob, CheckoutJobRepository, CheckoutJobStatus, CheckoutOutcome,
    CheckoutQueueStatistics, NewCheckoutJob, RetryPolicy,
};
pub use infrastructure::CheckoutJobRepositoryImpl;
pub use worker::CheckoutWorker;
