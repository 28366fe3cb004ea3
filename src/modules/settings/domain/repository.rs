/// Repository trait for settings persistence
///
/// Implementation uses Diesel ORM with PostgreSQL. Writes that set the
/// default flag must unset it on sibling records inside the same
/// transaction, so "at most one default per (field, locale)" is never
/// observable as violated.
use crate::modules::settings::domain::entities::{SettingChanges, SettingDraft, SettingRecord};
use crate::modules::settings::domain::value_objects::SettingField;
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// Conjunctive filters for listing settings; absent filters impose no
/// constraint
#[derive(Debug, Clone, Default)]
pub struct SettingsFilter {
    pub field: Option<SettingField>,
    pub locale: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Best active record for (field, locale): default-flagged first
    async fn find_for_locale(
        &self,
        field: SettingField,
        locale: &str,
    ) -> AppResult<Option<SettingRecord>>;

    /// First active default-flagged record for the field, any locale
    async fn find_default_any_locale(
        &self,
        field: SettingField,
    ) -> AppResult<Option<SettingRecord>>;

    /// First active record for the field, lowest settings_id wins
    async fn find_first_active(&self, field: SettingField) -> AppResult<Option<SettingRecord>>;

    /// Filtered page plus the total matching count (independent of the page)
    async fn list(
        &self,
        filter: &SettingsFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<SettingRecord>, u64)>;

    /// Insert a new setting; unsets sibling defaults in-transaction when the
    /// draft is default-flagged
    async fn insert(&self, draft: SettingDraft) -> AppResult<SettingRecord>;

    /// Partial update; unsets sibling defaults in-transaction when the
    /// default flag turns on. Unknown id is a NotFound error.
    async fn update(&self, settings_id: i32, changes: SettingChanges) -> AppResult<SettingRecord>;

    /// Delete by id; false for an unknown id, never an error
    async fn delete(&self, settings_id: i32) -> AppResult<bool>;
}
