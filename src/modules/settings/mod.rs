/// Settings bounded context
///
/// Resolves the effective configuration record for a (field, locale) pair
/// with a four-tier precedence chain (locale match, cross-locale default,
/// oldest active, environment fallback), encrypts credentials at rest and
/// masks sensitive sub-fields for display.
///
/// Architecture:
/// - Domain: entities, field/source value objects, repository trait, pure
///   obfuscation and normalization transforms
/// - Application: SettingsService (resolution, lifecycle, crypto)
/// - Infrastructure: Diesel-based repository implementation
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy access
pub use application::SettingsService;
pub use domain::{
    obfuscate_for_display, CredentialState, NewSetting, SettingField, SettingPatch, SettingRecord,
    SettingSource, SettingsFilter, SettingsRepository,
};
pub use infrastructure::SettingsRepositoryImpl;
