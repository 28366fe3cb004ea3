use crate::modules::settings::domain::{
    normalize_values, CredentialState, NewSetting, SettingChanges, SettingDraft, SettingField,
    SettingPatch, SettingRecord, SettingSource, SettingsFilter, SettingsRepository,
};
use crate::shared::application::{PaginatedResult, PaginationParams};
use crate::shared::config::{FallbackSettings, FallbackSource};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::CredentialCipher;
use chrono::Utc;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Settings resolution and lifecycle service
///
/// Resolves the effective configuration record for a (field, locale) pair
/// through a four-tier precedence chain, transparently encrypting the value
/// payload at rest and decrypting it on read. The encryption key and the
/// environment fallbacks are injected, never read from ambient globals.
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    cipher: CredentialCipher,
    fallbacks: FallbackSettings,
}

impl SettingsService {
    pub fn new(
        repo: Arc<dyn SettingsRepository>,
        cipher: CredentialCipher,
        fallbacks: FallbackSettings,
    ) -> Self {
        Self {
            repo,
            cipher,
            fallbacks,
        }
    }

    /// Resolve the effective setting for (field, locale)
    ///
    /// Precedence, active records only:
    /// 1. exact (field, locale) match, default-flagged preferred
    /// 2. default-flagged record for the field in any locale
    /// 3. oldest active record for the field
    /// 4. record synthesized from environment variables
    ///
    /// `Ok(None)` means configuration for the field is absent; this is a
    /// recoverable condition, not a failure.
    pub async fn get_effective_setting(
        &self,
        field: SettingField,
        locale: &str,
    ) -> AppResult<Option<SettingRecord>> {
        Ok(self
            .get_effective_setting_with_state(field, locale)
            .await?
            .map(|(record, _)| record))
    }

    /// Same as [`get_effective_setting`](Self::get_effective_setting), also
    /// reporting whether the credentials payload decrypted cleanly
    pub async fn get_effective_setting_with_state(
        &self,
        field: SettingField,
        locale: &str,
    ) -> AppResult<Option<(SettingRecord, CredentialState)>> {
        if let Some(record) = self.repo.find_for_locale(field, locale).await? {
            return Ok(Some(self.decrypt_record(record)));
        }

        if let Some(record) = self.repo.find_default_any_locale(field).await? {
            debug!(
                "No {} setting for locale {}, using default from locale {}",
                field, locale, record.locale
            );
            return Ok(Some(self.decrypt_record(record)));
        }

        if let Some(record) = self.repo.find_first_active(field).await? {
            debug!(
                "No default {} setting, using oldest active record {}",
                field, record.settings_id
            );
            return Ok(Some(self.decrypt_record(record)));
        }

        Ok(self
            .synthesize_from_env(field, locale)
            .map(|record| (record, CredentialState::Absent)))
    }

    /// List settings with conjunctive filters, ordered by (field, locale,
    /// settings_id)
    pub async fn list_settings(
        &self,
        filter: &SettingsFilter,
        pagination: &PaginationParams,
    ) -> AppResult<PaginatedResult<SettingRecord>> {
        let (records, total_count) = self
            .repo
            .list(filter, pagination.offset(), pagination.limit())
            .await?;

        let items = records
            .into_iter()
            .map(|record| self.decrypt_record(record).0)
            .collect();

        Ok(PaginatedResult::new(items, total_count, pagination))
    }

    /// Create a setting, encrypting its value into the credentials column
    pub async fn create_setting(&self, new: NewSetting) -> AppResult<SettingRecord> {
        let value = normalize_values(new.value);
        let value_json = serde_json::to_string(&value)?;
        let credentials = self.cipher.encrypt(&value_json);

        let draft = SettingDraft {
            locale: new.locale,
            provider: new.provider,
            field: new.field,
            value_json,
            credentials: Some(credentials),
            description: new.description,
            is_active: new.is_active,
            is_default: new.is_default,
        };

        let record = self.repo.insert(draft).await?;
        Ok(self.decrypt_record(record).0)
    }

    /// Partially update a setting
    ///
    /// A new value re-encrypts the credentials; turning the default flag on
    /// unsets it on siblings in the same transaction. Unknown ids fail with
    /// NotFound, and an all-empty patch is a caller error.
    pub async fn update_setting(
        &self,
        settings_id: i32,
        patch: SettingPatch,
    ) -> AppResult<SettingRecord> {
        if patch.is_empty() {
            return Err(AppError::InvalidInput(
                "Setting update payload is empty".to_string(),
            ));
        }

        let mut changes = SettingChanges {
            locale: patch.locale,
            provider: patch.provider,
            description: patch.description,
            is_active: patch.is_active,
            is_default: patch.is_default,
            ..Default::default()
        };

        if let Some(value) = patch.value {
            let value = normalize_values(value);
            let value_json = serde_json::to_string(&value)?;
            changes.credentials = Some(self.cipher.encrypt(&value_json));
            changes.value_json = Some(value_json);
        }

        let record = self.repo.update(settings_id, changes).await?;
        Ok(self.decrypt_record(record).0)
    }

    /// Delete a setting by id; false for an unknown id
    pub async fn delete_setting(&self, settings_id: i32) -> AppResult<bool> {
        self.repo.delete(settings_id).await
    }

    /// Replace `value` with the decrypted credentials payload
    ///
    /// Decryption or parse failure keeps the stored plaintext value and is
    /// reported through [`CredentialState::KeptStale`], never as an error.
    fn decrypt_record(&self, mut record: SettingRecord) -> (SettingRecord, CredentialState) {
        let token = match record.credentials.as_deref() {
            Some(token) if !token.is_empty() => token,
            _ => return (record, CredentialState::Absent),
        };

        match self.decrypt_value(token) {
            Ok(value) => {
                record.value = value;
                (record, CredentialState::Decrypted)
            }
            Err(e) => {
                warn!(
                    "Failed to decrypt credentials for setting {} ({}): {}; keeping stored value",
                    record.settings_id, record.field, e
                );
                (record, CredentialState::KeptStale)
            }
        }
    }

    fn decrypt_value(&self, token: &str) -> AppResult<Map<String, Value>> {
        let plaintext = self.cipher.decrypt(token)?;
        Ok(serde_json::from_str(&plaintext)?)
    }

    fn fallback_for(&self, field: SettingField) -> &dyn FallbackSource {
        match field {
            SettingField::Payment => &self.fallbacks.payment,
            SettingField::Logistics => &self.fallbacks.logistics,
            SettingField::Notification => &self.fallbacks.notification,
            SettingField::Cdn => &self.fallbacks.cdn,
            SettingField::Company => &self.fallbacks.company,
            SettingField::Crm => &self.fallbacks.crm,
            SettingField::Mail => &self.fallbacks.mail,
            SettingField::Bucket => &self.fallbacks.bucket,
        }
    }

    /// Build an ephemeral record from the environment fallback for the field
    ///
    /// Succeeds only if at least one non-identity value is present; the
    /// record is never persisted.
    fn synthesize_from_env(&self, field: SettingField, locale: &str) -> Option<SettingRecord> {
        let fallback = self.fallback_for(field);
        if !fallback.has_values() {
            return None;
        }

        debug!(
            "No {} setting persisted, falling back to environment variables",
            field
        );

        let now = Utc::now();
        Some(SettingRecord {
            settings_id: 0,
            locale: locale.to_string(),
            provider: fallback.provider().to_string(),
            field,
            value: fallback.value_map(),
            credentials: None,
            description: "Derived from environment variables".to_string(),
            is_active: true,
            is_default: true,
            source: SettingSource::EnvironmentDerived,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::settings::domain::repository::MockSettingsRepository;
    use crate::shared::config::PaymentFallback;
    use mockall::predicate::eq;
    use serde_json::json;

    fn cipher() -> CredentialCipher {
        CredentialCipher::new(&CredentialCipher::generate_key()).unwrap()
    }

    fn value_map(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn record(
        settings_id: i32,
        field: SettingField,
        locale: &str,
        is_default: bool,
        value: Map<String, Value>,
        credentials: Option<String>,
    ) -> SettingRecord {
        let now = Utc::now();
        SettingRecord {
            settings_id,
            locale: locale.to_string(),
            provider: "test-provider".to_string(),
            field,
            value,
            credentials,
            description: String::new(),
            is_active: true,
            is_default,
            source: SettingSource::Persisted,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(repo: MockSettingsRepository, cipher: CredentialCipher) -> SettingsService {
        SettingsService::new(Arc::new(repo), cipher, FallbackSettings::default())
    }

    #[tokio::test]
    async fn test_exact_locale_match_wins() {
        let cipher = cipher();
        let value = value_map(&[("gateway_key", json!("abcd1234"))]);
        let expected = record(2, SettingField::Payment, "pt-br", true, value, None);

        let mut repo = MockSettingsRepository::new();
        let returned = expected.clone();
        repo.expect_find_for_locale()
            .with(eq(SettingField::Payment), eq("pt-br"))
            .return_once(move |_, _| Ok(Some(returned)));
        repo.expect_find_default_any_locale().never();
        repo.expect_find_first_active().never();

        let resolved = service(repo, cipher)
            .get_effective_setting(SettingField::Payment, "pt-br")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.settings_id, 2);
        assert!(resolved.is_default);
    }

    #[tokio::test]
    async fn test_falls_through_to_default_then_first_active() {
        let cipher = cipher();
        let expected = record(
            7,
            SettingField::Payment,
            "en-us",
            false,
            value_map(&[("gateway_key", json!("k"))]),
            None,
        );

        let mut repo = MockSettingsRepository::new();
        repo.expect_find_for_locale().return_once(|_, _| Ok(None));
        repo.expect_find_default_any_locale()
            .return_once(|_| Ok(None));
        let returned = expected.clone();
        repo.expect_find_first_active()
            .with(eq(SettingField::Payment))
            .return_once(move |_| Ok(Some(returned)));

        let resolved = service(repo, cipher)
            .get_effective_setting(SettingField::Payment, "pt-br")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.settings_id, 7);
    }

    #[tokio::test]
    async fn test_environment_fallback_synthesizes_record() {
        let cipher = cipher();
        let mut repo = MockSettingsRepository::new();
        repo.expect_find_for_locale().return_once(|_, _| Ok(None));
        repo.expect_find_default_any_locale()
            .return_once(|_| Ok(None));
        repo.expect_find_first_active().return_once(|_| Ok(None));

        let fallbacks = FallbackSettings {
            payment: PaymentFallback {
                provider: "stripe".to_string(),
                gateway_key: Some("sk_test_123".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let service = SettingsService::new(Arc::new(repo), cipher, fallbacks);

        let resolved = service
            .get_effective_setting(SettingField::Payment, "pt-br")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.settings_id, 0);
        assert!(resolved.is_default);
        assert_eq!(resolved.source, SettingSource::EnvironmentDerived);
        assert_eq!(resolved.provider, "stripe");
        assert_eq!(resolved.value["gateway_key"], json!("sk_test_123"));
    }

    #[tokio::test]
    async fn test_no_setting_anywhere_is_a_recoverable_miss() {
        let cipher = cipher();
        let mut repo = MockSettingsRepository::new();
        repo.expect_find_for_locale().return_once(|_, _| Ok(None));
        repo.expect_find_default_any_locale()
            .return_once(|_| Ok(None));
        repo.expect_find_first_active().return_once(|_| Ok(None));

        // Empty fallbacks: provider alone never qualifies
        let resolved = service(repo, cipher)
            .get_effective_setting(SettingField::Payment, "pt-br")
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_credentials_round_trip_on_read() {
        let cipher = cipher();
        let original = value_map(&[
            ("gateway_key", json!("abcd1234")),
            ("environment", json!("production")),
            ("timeout", json!(30)),
        ]);
        let token = cipher.encrypt(&serde_json::to_string(&original).unwrap());

        // The stored plaintext value is stale on purpose
        let stale = value_map(&[("gateway_key", json!("old"))]);
        let stored = record(1, SettingField::Payment, "pt-br", true, stale, Some(token));

        let mut repo = MockSettingsRepository::new();
        repo.expect_find_for_locale()
            .return_once(move |_, _| Ok(Some(stored)));

        let resolved = service(repo, cipher)
            .get_effective_setting_with_state(SettingField::Payment, "pt-br")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.1, CredentialState::Decrypted);
        assert_eq!(resolved.0.value, original);
    }

    #[tokio::test]
    async fn test_decrypt_failure_keeps_stale_value() {
        let cipher = cipher();
        let stale = value_map(&[("gateway_key", json!("stale-but-usable"))]);
        let stored = record(
            1,
            SettingField::Payment,
            "pt-br",
            true,
            stale.clone(),
            Some("corrupted-token".to_string()),
        );

        let mut repo = MockSettingsRepository::new();
        repo.expect_find_for_locale()
            .return_once(move |_, _| Ok(Some(stored)));

        let (resolved, state) = service(repo, cipher)
            .get_effective_setting_with_state(SettingField::Payment, "pt-br")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state, CredentialState::KeptStale);
        assert_eq!(resolved.value, stale);
    }

    #[tokio::test]
    async fn test_create_encrypts_value_into_credentials() {
        let cipher = cipher();
        let probe = cipher.clone();
        let value = value_map(&[("gateway_key", json!("sk_live_42"))]);

        let mut repo = MockSettingsRepository::new();
        repo.expect_insert()
            .withf(move |draft| {
                let token = draft.credentials.as_deref().unwrap();
                let plaintext = probe.decrypt(token).unwrap();
                plaintext == draft.value_json
                    && draft.value_json.contains("sk_live_42")
                    && draft.is_default
            })
            .return_once(|draft| {
                let value = serde_json::from_str(&draft.value_json).unwrap();
                Ok(record(
                    10,
                    draft.field,
                    &draft.locale,
                    draft.is_default,
                    value,
                    draft.credentials,
                ))
            });

        let created = service(repo, cipher)
            .create_setting(NewSetting {
                locale: "pt-br".to_string(),
                provider: "stripe".to_string(),
                field: SettingField::Payment,
                value,
                description: "primary gateway".to_string(),
                is_active: true,
                is_default: true,
            })
            .await
            .unwrap();
        assert_eq!(created.settings_id, 10);
        assert_eq!(created.value["gateway_key"], json!("sk_live_42"));
    }

    #[tokio::test]
    async fn test_update_with_value_refreshes_credentials() {
        let cipher = cipher();
        let probe = cipher.clone();

        let mut repo = MockSettingsRepository::new();
        repo.expect_update()
            .withf(move |id, changes| {
                let token = changes.credentials.as_deref().unwrap();
                let plaintext = probe.decrypt(token).unwrap();
                *id == 5
                    && changes.value_json.as_deref() == Some(plaintext.as_str())
                    && changes.locale.is_none()
            })
            .return_once(|id, changes| {
                let value = serde_json::from_str(changes.value_json.as_deref().unwrap()).unwrap();
                Ok(record(
                    id,
                    SettingField::Mail,
                    "pt-br",
                    false,
                    value,
                    changes.credentials,
                ))
            });

        let patch = SettingPatch {
            value: Some(value_map(&[("smtp_password", json!("hunter2222"))])),
            ..Default::default()
        };
        let updated = service(repo, cipher)
            .update_setting(5, patch)
            .await
            .unwrap();
        assert_eq!(updated.value["smtp_password"], json!("hunter2222"));
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_is_invalid_input() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_update().never();

        let err = service(repo, cipher())
            .update_setting(5, SettingPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_update()
            .return_once(|id, _| Err(AppError::NotFound(format!("Setting {} not found", id))));

        let patch = SettingPatch {
            is_active: Some(false),
            ..Default::default()
        };
        let err = service(repo, cipher())
            .update_setting(99, patch)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_returns_false() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_delete().with(eq(99)).return_once(|_| Ok(false));

        let deleted = service(repo, cipher()).delete_setting(99).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_list_decrypts_every_row() {
        let cipher = cipher();
        let value_a = value_map(&[("api_key", json!("key-aaaa-1"))]);
        let value_b = value_map(&[("api_key", json!("key-bbbb-2"))]);
        let token_a = cipher.encrypt(&serde_json::to_string(&value_a).unwrap());
        let token_b = cipher.encrypt(&serde_json::to_string(&value_b).unwrap());
        let rows = vec![
            record(
                1,
                SettingField::Crm,
                "pt-br",
                true,
                Map::new(),
                Some(token_a),
            ),
            record(
                2,
                SettingField::Crm,
                "en-us",
                false,
                Map::new(),
                Some(token_b),
            ),
        ];

        let mut repo = MockSettingsRepository::new();
        repo.expect_list()
            .withf(|_, offset, limit| *offset == 0 && *limit == 20)
            .return_once(move |_, _, _| Ok((rows, 12)));

        let page = service(repo, cipher)
            .list_settings(&SettingsFilter::default(), &PaginationParams::default())
            .await
            .unwrap();
        assert_eq!(page.total_count, 12);
        assert_eq!(page.items[0].value, value_a);
        assert_eq!(page.items[1].value, value_b);
    }
}
