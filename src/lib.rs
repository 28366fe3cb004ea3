//! Core of the storefront e-commerce backend: settings resolution with
//! encrypted credentials, and the retry/expiry policy for asynchronous
//! checkout jobs. HTTP routing and gateway clients live in the surrounding
//! services and consume this crate through the module services and traits.

pub mod modules;
mod schema;
pub mod shared;

pub use modules::checkout::{
    CheckoutExecutor, CheckoutJob, CheckoutJobRepository, CheckoutJobRepositoryImpl,
    CheckoutJobStatus, CheckoutOutcome, CheckoutWorker, NewCheckoutJob, RetryPolicy,
};
pub use modules::settings::{
    obfuscate_for_display, NewSetting, SettingField, SettingPatch, SettingRecord, SettingSource,
    SettingsFilter, SettingsRepository, SettingsRepositoryImpl, SettingsService,
};
pub use shared::config::FallbackSettings;
pub use shared::errors::{AppError, AppResult};
pub use shared::{CredentialCipher, Database};
