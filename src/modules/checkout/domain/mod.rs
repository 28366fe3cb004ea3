pub mod entities;
pub mod gateway;
pub mod repository;
pub mod retry;
pub mod value_objects;

pub use entities::{CheckoutJob, CheckoutJobStatus, NewCheckoutJob};
pub use gateway::{CheckoutExecutor, CheckoutOutcome};
pub use repository::{CheckoutJobRepository, CheckoutQueueStatistics};
pub use retry::RetryPolicy;
pub use value_objects::CheckoutJobStatusDb;
