pub mod entities;
pub mod obfuscation;
pub mod repository;
pub mod value_objects;

pub use entities::{NewSetting, SettingChanges, SettingDraft, SettingPatch, SettingRecord};
pub use obfuscation::{normalize_values, obfuscate_for_display, sensitive_keys};
pub use repository::{SettingsFilter, SettingsRepository};
pub use value_objects::{CredentialState, SettingField, SettingSource};
