/// Diesel-based implementation of CheckoutJobRepository
///
/// Uses PostgreSQL with SELECT FOR UPDATE SKIP LOCKED for atomic job claims,
/// so concurrent workers never double-run the same scheduled attempt.
use crate::modules::checkout::domain::entities::{CheckoutJob, NewCheckoutJob};
use crate::modules::checkout::domain::repository::{
    CheckoutJobRepository, CheckoutQueueStatistics,
};
use crate::modules::checkout::domain::value_objects::CheckoutJobStatusDb;
use crate::modules::checkout::infrastructure::models::{CheckoutJobModel, NewCheckoutJobRow};
use crate::schema::checkout_jobs;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::database::{DbConnection, DbPool};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tokio::task;

pub struct CheckoutJobRepositoryImpl {
    pool: DbPool,
}

impl CheckoutJobRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckoutJobRepository for CheckoutJobRepositoryImpl {
    async fn enqueue(&self, job: NewCheckoutJob) -> AppResult<CheckoutJob> {
        let pool = self.pool.clone();

        let inserted = task::spawn_blocking(move || -> AppResult<CheckoutJobModel> {
            let mut conn = pool.get()?;
            let row = NewCheckoutJobRow::from(job);

            let inserted = diesel::insert_into(checkout_jobs::table)
                .values(&row)
                .returning(CheckoutJobModel::as_returning())
                .get_result(&mut conn)?;
            Ok(inserted)
        })
        .await??;

        Ok(inserted.into_job())
    }

    async fn find_by_cart(&self, cart_uuid: &str) -> AppResult<Option<CheckoutJob>> {
        let pool = self.pool.clone();
        let cart_uuid = cart_uuid.to_string();

        let job = task::spawn_blocking(move || -> AppResult<Option<CheckoutJobModel>> {
            let mut conn = pool.get()?;
            let m = checkout_jobs::table
                .find(cart_uuid)
                .select(CheckoutJobModel::as_select())
                .first(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        Ok(job.map(|j| j.into_job()))
    }

    async fn claim_due(&self, now: DateTime<Utc>) -> AppResult<Option<CheckoutJob>> {
        let pool = self.pool.clone();

        // Atomic claim using SELECT FOR UPDATE SKIP LOCKED. Fresh jobs have
        // never run; rescheduled jobs are due once next_run_at passes. The
        // claim clears next_run_at so the job is invisible to other workers
        // until the execution outcome is recorded; a claim whose worker died
        // before recording an outcome becomes claimable again after 10 minutes.
        let claimed = task::spawn_blocking(move || -> AppResult<Option<CheckoutJobModel>> {
            let mut conn = pool.get()?;
            let m = diesel::sql_query(
                r#"
                UPDATE checkout_jobs
                SET last_run_at = $1,
                    next_run_at = NULL,
                    updated_at = $1
                WHERE cart_uuid = (
                    SELECT cart_uuid
                    FROM checkout_jobs
                    WHERE status = 'pending'
                      AND (
                        last_run_at IS NULL
                        OR next_run_at <= $1
                        OR (next_run_at IS NULL AND last_run_at < $1 - interval '10 minutes')
                      )
                    ORDER BY created_at ASC
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                RETURNING cart_uuid, payment_gateway, payment_method, payload, status,
                          attempts, next_run_at, last_run_at, last_error,
                          order_id, gateway_payment_id, created_at, updated_at
                "#,
            )
            .bind::<diesel::sql_types::Timestamptz, _>(now)
            .get_result(&mut conn)
            .optional()?;
            Ok(m)
        })
        .await??;

        Ok(claimed.map(|j| j.into_job()))
    }

    async fn mark_succeeded(
        &self,
        cart_uuid: &str,
        order_id: &str,
        gateway_payment_id: &str,
    ) -> AppResult<()> {
        let pool = self.pool.clone();
        let cart_uuid = cart_uuid.to_string();
        let order_id = order_id.to_string();
        let gateway_payment_id = gateway_payment_id.to_string();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = pool.get()?;
            diesel::update(checkout_jobs::table.find(cart_uuid))
                .set((
                    checkout_jobs::status.eq(CheckoutJobStatusDb::Succeeded),
                    checkout_jobs::order_id.eq(order_id),
                    checkout_jobs::gateway_payment_id.eq(gateway_payment_id),
                    checkout_jobs::last_error.eq(None::<String>),
                    checkout_jobs::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await?
    }

    async fn reschedule(
        &self,
        cart_uuid: &str,
        error: &str,
        next_run_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let pool = self.pool.clone();
        let cart_uuid = cart_uuid.to_string();
        let error = error.to_string();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = pool.get()?;
            diesel::update(checkout_jobs::table.find(cart_uuid))
                .set((
                    checkout_jobs::attempts.eq(checkout_jobs::attempts + 1),
                    checkout_jobs::next_run_at.eq(next_run_at),
                    checkout_jobs::last_error.eq(error),
                    checkout_jobs::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await?
    }

    async fn mark_failed(&self, cart_uuid: &str, error: &str) -> AppResult<()> {
        let pool = self.pool.clone();
        let cart_uuid = cart_uuid.to_string();
        let error = error.to_string();

        task::spawn_blocking(move || -> AppResult<()> {
            let mut conn = pool.get()?;
            diesel::update(checkout_jobs::table.find(cart_uuid))
                .set((
                    checkout_jobs::status.eq(CheckoutJobStatusDb::Failed),
                    checkout_jobs::attempts.eq(checkout_jobs::attempts + 1),
                    checkout_jobs::last_error.eq(error),
                    checkout_jobs::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)?;
            Ok(())
        })
        .await?
    }

    async fn expire_stale(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<usize> {
            let mut conn = pool.get()?;
            let expired = diesel::update(
                checkout_jobs::table
                    .filter(checkout_jobs::status.eq(CheckoutJobStatusDb::Pending))
                    .filter(checkout_jobs::updated_at.lt(cutoff)),
            )
            .set((
                checkout_jobs::status.eq(CheckoutJobStatusDb::Expired),
                checkout_jobs::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
            Ok(expired)
        })
        .await?
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<usize> {
            let mut conn = pool.get()?;
            let purged = diesel::delete(
                checkout_jobs::table
                    .filter(checkout_jobs::status.eq(CheckoutJobStatusDb::Expired))
                    .filter(checkout_jobs::updated_at.lt(cutoff)),
            )
            .execute(&mut conn)?;
            Ok(purged)
        })
        .await?
    }

    async fn statistics(&self) -> AppResult<CheckoutQueueStatistics> {
        let pool = self.pool.clone();

        task::spawn_blocking(move || -> AppResult<CheckoutQueueStatistics> {
            let mut conn = pool.get()?;

            let count_for =
                |status: CheckoutJobStatusDb, conn: &mut DbConnection| -> AppResult<i64> {
                    let n = checkout_jobs::table
                        .filter(checkout_jobs::status.eq(status))
                        .count()
                        .get_result(conn)?;
                    Ok(n)
                };

            let pending = count_for(CheckoutJobStatusDb::Pending, &mut conn)?;
            let succeeded = count_for(CheckoutJobStatusDb::Succeeded, &mut conn)?;
            let failed = count_for(CheckoutJobStatusDb::Failed, &mut conn)?;
            let expired = count_for(CheckoutJobStatusDb::Expired, &mut conn)?;

            let total: i64 = checkout_jobs::table.count().get_result(&mut conn)?;

            Ok(CheckoutQueueStatistics {
                pending_count: pending,
                succeeded_count: succeeded,
                failed_count: failed,
                expired_count: expired,
                total_count: total,
            })
        })
        .await?
    }
}
