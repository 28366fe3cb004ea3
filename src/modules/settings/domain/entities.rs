/// Domain entities for the settings context
///
/// A setting is one configuration entry for a (field, locale) combination.
/// The structured `value` mapping is what callers consume; `credentials` is
/// the encrypted-at-rest serialization of that mapping.
use crate::modules::settings::domain::value_objects::{SettingField, SettingSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Effective configuration record for a (field, locale) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingRecord {
    pub settings_id: i32,
    pub locale: String,
    pub provider: String,
    pub field: SettingField,
    pub value: Map<String, Value>,
    pub credentials: Option<String>,
    pub description: String,
    pub is_active: bool,
    pub is_default: bool,
    pub source: SettingSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SettingRecord {
    pub fn is_persisted(&self) -> bool {
        self.source == SettingSource::Persisted
    }
}

/// Input for creating a setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSetting {
    pub locale: String,
    pub provider: String,
    pub field: SettingField,
    pub value: Map<String, Value>,
    pub description: String,
    pub is_active: bool,
    pub is_default: bool,
}

/// Partial update for a setting; only present fields are mutated
///
/// The field category itself is immutable once created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingPatch {
    pub locale: Option<String>,
    pub provider: Option<String>,
    pub value: Option<Map<String, Value>>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
}

impl SettingPatch {
    pub fn is_empty(&self) -> bool {
        self.locale.is_none()
            && self.provider.is_none()
            && self.value.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.is_default.is_none()
    }
}

/// Persistence-ready form of a new setting: `value` already serialized and
/// encrypted by the application layer
#[derive(Debug, Clone)]
pub struct SettingDraft {
    pub locale: String,
    pub provider: String,
    pub field: SettingField,
    pub value_json: String,
    pub credentials: Option<String>,
    pub description: String,
    pub is_active: bool,
    pub is_default: bool,
}

/// Persistence-ready form of a partial update
///
/// `value_json` and `credentials` are always refreshed together when the
/// structured value changes.
#[derive(Debug, Clone, Default)]
pub struct SettingChanges {
    pub locale: Option<String>,
    pub provider: Option<String>,
    pub value_json: Option<String>,
    pub credentials: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
}
