/// Background worker for processing asynchronous checkout jobs
///
/// Continuously claims due jobs, drives them through the payment gateway and
/// applies the retry policy to failures. A companion sweep loop ages out jobs
/// that have stalled past the retention window, then purges old expired rows.
use crate::modules::checkout::domain::entities::CheckoutJob;
use crate::modules::checkout::domain::gateway::CheckoutExecutor;
use crate::modules::checkout::domain::repository::{
    CheckoutJobRepository, CheckoutQueueStatistics,
};
use crate::modules::checkout::domain::retry::RetryPolicy;
use crate::shared::errors::AppResult;
use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct CheckoutWorker {
    job_repository: Arc<dyn CheckoutJobRepository>,
    executor: Arc<dyn CheckoutExecutor>,
    policy: RetryPolicy,
    poll_interval: Duration,
    sweep_interval: Duration,
    is_running: Arc<tokio::sync::RwLock<bool>>,
}

impl CheckoutWorker {
    pub fn new(
        job_repository: Arc<dyn CheckoutJobRepository>,
        executor: Arc<dyn CheckoutExecutor>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            job_repository,
            executor,
            policy,
            poll_interval: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(3600),
            is_running: Arc::new(tokio::sync::RwLock::new(false)),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Run the worker loop; call with tokio::spawn to run in the background
    pub async fn run(self: Arc<Self>) {
        info!("Checkout worker started");

        {
            let mut running = self.is_running.write().await;
            *running = true;
        }

        loop {
            {
                let running = self.is_running.read().await;
                if !*running {
                    info!("Checkout worker stopped");
                    break;
                }
            }

            match self.process_next_job().await {
                Ok(processed) => {
                    if !processed {
                        // No jobs due, sleep before next poll
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
                Err(e) => {
                    error!("Error in checkout worker loop: {}", e);
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Run the expiry sweep loop; call with tokio::spawn
    pub async fn run_sweeper(self: Arc<Self>) {
        info!("Checkout expiry sweeper started");

        // The worker and sweeper loops may be spawned in either order
        {
            let mut running = self.is_running.write().await;
            *running = true;
        }

        let mut ticker = tokio::time::interval(self.sweep_interval);
        loop {
            ticker.tick().await;

            {
                let running = self.is_running.read().await;
                if !*running {
                    info!("Checkout expiry sweeper stopped");
                    break;
                }
            }

            if let Err(e) = self.sweep().await {
                error!("Error in checkout expiry sweep: {}", e);
            }
        }
    }

    /// Stop the worker and sweeper loops
    pub async fn stop(&self) {
        let mut running = self.is_running.write().await;
        *running = false;
        info!("Checkout worker stop requested");
    }

    /// Process the next due job in the queue
    ///
    /// Returns true if a job was processed, false if nothing was due
    pub async fn process_next_job(&self) -> AppResult<bool> {
        let now = Utc::now();
        let job = match self.job_repository.claim_due(now).await? {
            Some(job) => job,
            None => return Ok(false),
        };

        info!(
            "Processing checkout job {} (gateway: {}, attempts: {}/{})",
            job.cart_uuid,
            job.payment_gateway,
            job.attempts,
            self.policy.max_attempts()
        );

        match self.executor.execute(&job).await {
            Ok(outcome) => {
                self.job_repository
                    .mark_succeeded(&job.cart_uuid, &outcome.order_id, &outcome.gateway_payment_id)
                    .await?;
                info!(
                    "Checkout job {} succeeded (order: {})",
                    job.cart_uuid, outcome.order_id
                );
            }
            Err(e) => {
                let error_msg = e.to_string();
                warn!("Checkout job {} failed: {}", job.cart_uuid, error_msg);
                self.handle_failure(&job, &error_msg).await?;
            }
        }

        Ok(true)
    }

    /// Apply the retry policy to a failed execution
    async fn handle_failure(&self, job: &CheckoutJob, error_msg: &str) -> AppResult<()> {
        let attempts = job.attempts.max(0) as u32;
        match self.policy.next_backoff_delay(attempts) {
            Some(delay) => {
                // The claim stamped last_run_at for this execution
                let last_run = job.last_run_at.unwrap_or_else(Utc::now);
                let next_run_at = last_run + delay;
                info!(
                    "Checkout job {} will be retried at {} (attempt {}/{})",
                    job.cart_uuid,
                    next_run_at,
                    attempts + 1,
                    self.policy.max_attempts()
                );
                self.job_repository
                    .reschedule(&job.cart_uuid, error_msg, next_run_at)
                    .await
            }
            None => {
                error!(
                    "Checkout job {} failed permanently after {} attempts",
                    job.cart_uuid, attempts
                );
                self.job_repository
                    .mark_failed(&job.cart_uuid, error_msg)
                    .await
            }
        }
    }

    /// Expire stalled jobs and purge old expired rows
    pub async fn sweep(&self) -> AppResult<(usize, usize)> {
        let cutoff = self.policy.expiry_cutoff(Utc::now());

        let expired = self.job_repository.expire_stale(cutoff).await?;
        if expired > 0 {
            warn!("Expired {} stalled checkout jobs", expired);
        }

        let purged = self.job_repository.purge_expired(cutoff).await?;
        if purged > 0 {
            info!("Purged {} expired checkout jobs", purged);
        }

        Ok((expired, purged))
    }

    /// Get statistics about the queue
    pub async fn statistics(&self) -> AppResult<CheckoutQueueStatistics> {
        self.job_repository.statistics().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::checkout::domain::entities::CheckoutJobStatus;
    use crate::modules::checkout::domain::gateway::{CheckoutOutcome, MockCheckoutExecutor};
    use crate::modules::checkout::domain::repository::MockCheckoutJobRepository;
    use crate::shared::errors::AppError;
    use chrono::{DateTime, Duration as ChronoDuration, Utc};
    use mockall::predicate::eq;
    use serde_json::json;

    fn job(attempts: i32, last_run_at: Option<DateTime<Utc>>) -> CheckoutJob {
        let now = Utc::now();
        CheckoutJob {
            cart_uuid: "cart-1".to_string(),
            payment_gateway: "stripe".to_string(),
            payment_method: "credit_card".to_string(),
            payload: json!({"total": 100}),
            status: CheckoutJobStatus::Pending,
            attempts,
            next_run_at: None,
            last_run_at,
            last_error: None,
            order_id: None,
            gateway_payment_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn worker(
        repo: MockCheckoutJobRepository,
        executor: MockCheckoutExecutor,
    ) -> CheckoutWorker {
        CheckoutWorker::new(Arc::new(repo), Arc::new(executor), RetryPolicy::default())
    }

    #[tokio::test]
    async fn test_empty_queue_processes_nothing() {
        let mut repo = MockCheckoutJobRepository::new();
        repo.expect_claim_due().return_once(|_| Ok(None));
        let mut executor = MockCheckoutExecutor::new();
        executor.expect_execute().never();

        let processed = worker(repo, executor).process_next_job().await.unwrap();
        assert!(!processed);
    }

    #[tokio::test]
    async fn test_successful_execution_marks_succeeded() {
        let mut repo = MockCheckoutJobRepository::new();
        repo.expect_claim_due()
            .return_once(|now| Ok(Some(job(0, Some(now)))));
        repo.expect_mark_succeeded()
            .with(eq("cart-1"), eq("order-77"), eq("pay-123"))
            .return_once(|_, _, _| Ok(()));

        let mut executor = MockCheckoutExecutor::new();
        executor.expect_execute().return_once(|_| {
            Ok(CheckoutOutcome {
                order_id: "order-77".to_string(),
                gateway_payment_id: "pay-123".to_string(),
            })
        });

        let processed = worker(repo, executor).process_next_job().await.unwrap();
        assert!(processed);
    }

    #[tokio::test]
    async fn test_failure_reschedules_with_backoff() {
        let last_run = Utc::now();
        let expected_next = last_run + ChronoDuration::seconds(600);

        let mut repo = MockCheckoutJobRepository::new();
        repo.expect_claim_due()
            .return_once(move |_| Ok(Some(job(1, Some(last_run)))));
        repo.expect_reschedule()
            .withf(move |cart, error, next_run_at| {
                cart == "cart-1" && error.contains("declined") && *next_run_at == expected_next
            })
            .return_once(|_, _, _| Ok(()));
        repo.expect_mark_failed().never();

        let mut executor = MockCheckoutExecutor::new();
        executor
            .expect_execute()
            .return_once(|_| Err(AppError::ValidationError("card declined".to_string())));

        let processed = worker(repo, executor).process_next_job().await.unwrap();
        assert!(processed);
    }

    #[tokio::test]
    async fn test_first_failure_uses_first_delay() {
        let last_run = Utc::now();
        let expected_next = last_run + ChronoDuration::seconds(300);

        let mut repo = MockCheckoutJobRepository::new();
        repo.expect_claim_due()
            .return_once(move |_| Ok(Some(job(0, Some(last_run)))));
        repo.expect_reschedule()
            .withf(move |_, _, next_run_at| *next_run_at == expected_next)
            .return_once(|_, _, _| Ok(()));

        let mut executor = MockCheckoutExecutor::new();
        executor
            .expect_execute()
            .return_once(|_| Err(AppError::InternalError("gateway timeout".to_string())));

        worker(repo, executor).process_next_job().await.unwrap();
    }

    #[tokio::test]
    async fn test_exhausted_retries_mark_failed() {
        let mut repo = MockCheckoutJobRepository::new();
        repo.expect_claim_due()
            .return_once(|now| Ok(Some(job(3, Some(now)))));
        repo.expect_reschedule().never();
        repo.expect_mark_failed()
            .with(eq("cart-1"), eq("gateway timeout"))
            .return_once(|_, _| Ok(()));

        let mut executor = MockCheckoutExecutor::new();
        executor
            .expect_execute()
            .return_once(|_| Err(AppError::InternalError("gateway timeout".to_string())));

        let processed = worker(repo, executor).process_next_job().await.unwrap();
        assert!(processed);
    }

    #[tokio::test]
    async fn test_sweeper_runs_without_worker_loop() {
        let mut repo = MockCheckoutJobRepository::new();
        repo.expect_expire_stale().times(1..).returning(|_| Ok(0));
        repo.expect_purge_expired().times(1..).returning(|_| Ok(0));
        let executor = MockCheckoutExecutor::new();

        let worker = Arc::new(
            worker(repo, executor).with_sweep_interval(Duration::from_millis(10)),
        );
        let handle = tokio::spawn(Arc::clone(&worker).run_sweeper());

        tokio::time::sleep(Duration::from_millis(50)).await;
        worker.stop().await;
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_expires_then_purges_with_retention_cutoff() {
        let mut repo = MockCheckoutJobRepository::new();
        repo.expect_expire_stale()
            .withf(|cutoff| {
                let distance = Utc::now() - *cutoff - ChronoDuration::days(7);
                distance.num_seconds().abs() < 5
            })
            .return_once(|_| Ok(2));
        repo.expect_purge_expired().return_once(|_| Ok(1));

        let executor = MockCheckoutExecutor::new();
        let (expired, purged) = worker(repo, executor).sweep().await.unwrap();
        assert_eq!(expired, 2);
        assert_eq!(purged, 1);
    }
}
