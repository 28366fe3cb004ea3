/// Retry and expiry policy for checkout jobs
///
/// Pure, deterministic decisions: a fixed escalating backoff schedule with no
/// jitter, and a strict retention cutoff for abandoning stalled jobs. The
/// policy holds no state beyond its configuration and is safe to share across
/// any number of worker tasks.
use chrono::{DateTime, Duration, Utc};

/// Escalating retry delays in seconds, indexed by the attempt count
const BACKOFF_SCHEDULE_SECS: [i64; 3] = [300, 600, 1200];

const RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    schedule_secs: Vec<i64>,
    retention: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            schedule_secs: BACKOFF_SCHEDULE_SECS.to_vec(),
            retention: Duration::days(RETENTION_DAYS),
        }
    }
}

impl RetryPolicy {
    pub fn new(schedule_secs: Vec<i64>, retention: Duration) -> Self {
        Self {
            schedule_secs,
            retention,
        }
    }

    /// Delay before the next retry, indexed 0-based by the number of failed
    /// attempts so far
    ///
    /// `None` means the schedule is exhausted and the job must transition to
    /// its terminal failed state. Exhaustion is a normal outcome, not an
    /// error.
    pub fn next_backoff_delay(&self, attempts: u32) -> Option<Duration> {
        self.schedule_secs
            .get(attempts as usize)
            .map(|secs| Duration::seconds(*secs))
    }

    pub fn max_attempts(&self) -> u32 {
        self.schedule_secs.len() as u32
    }

    /// Whether a job last touched at `updated_at` has aged out of the
    /// retention window; the boundary instant itself is not expired
    pub fn is_job_expired(&self, updated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        updated_at < now - self.retention
    }

    /// [`is_job_expired`](Self::is_job_expired) against the current instant
    pub fn is_job_expired_now(&self, updated_at: DateTime<Utc>) -> bool {
        self.is_job_expired(updated_at, Utc::now())
    }

    /// Instant before which jobs are considered stale
    pub fn expiry_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.retention
    }
}
