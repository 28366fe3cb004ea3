/// Diesel models for the settings table
use crate::modules::settings::domain::{SettingChanges, SettingDraft, SettingRecord, SettingSource};
use crate::schema::settings;
use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Map;

/// Diesel model for querying existing settings
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = settings)]
pub struct SettingModel {
    pub settings_id: i32,
    pub locale: String,
    pub provider: String,
    pub field: String,
    pub value: String,
    pub credentials: Option<String>,
    pub description: String,
    pub is_active: bool,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SettingModel {
    /// Convert to the domain record, parsing the field category and the
    /// JSON-serialized value column
    pub fn into_record(self) -> AppResult<SettingRecord> {
        let field = self.field.parse().map_err(|e: String| {
            AppError::InternalError(format!("Corrupt settings row {}: {}", self.settings_id, e))
        })?;

        let value: Map<String, serde_json::Value> = if self.value.trim().is_empty() {
            Map::new()
        } else {
            serde_json::from_str(&self.value)?
        };

        Ok(SettingRecord {
            settings_id: self.settings_id,
            locale: self.locale,
            provider: self.provider,
            field,
            value,
            credentials: self.credentials,
            description: self.description,
            is_active: self.is_active,
            is_default: self.is_default,
            source: SettingSource::Persisted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Diesel model for inserting new settings
#[derive(Insertable, Debug)]
#[diesel(table_name = settings)]
pub struct NewSettingRow {
    pub locale: String,
    pub provider: String,
    pub field: String,
    pub value: String,
    pub credentials: Option<String>,
    pub description: String,
    pub is_active: bool,
    pub is_default: bool,
}

impl From<SettingDraft> for NewSettingRow {
    fn from(draft: SettingDraft) -> Self {
        Self {
            locale: draft.locale,
            provider: draft.provider,
            field: draft.field.as_str().to_string(),
            value: draft.value_json,
            credentials: draft.credentials,
            description: draft.description,
            is_active: draft.is_active,
            is_default: draft.is_default,
        }
    }
}

/// Diesel changeset for partial updates; None fields are left untouched
#[derive(AsChangeset, Debug)]
#[diesel(table_name = settings)]
pub struct SettingChangeset {
    pub locale: Option<String>,
    pub provider: Option<String>,
    pub value: Option<String>,
    pub credentials: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl From<SettingChanges> for SettingChangeset {
    fn from(changes: SettingChanges) -> Self {
        Self {
            locale: changes.locale,
            provider: changes.provider,
            value: changes.value_json,
            credentials: changes.credentials,
            description: changes.description,
            is_active: changes.is_active,
            is_default: changes.is_default,
            updated_at: Utc::now(),
        }
    }
}
