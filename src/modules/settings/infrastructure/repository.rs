/// Diesel-based implementation of SettingsRepository
///
/// The sibling-default unset always runs inside the same transaction as the
/// triggering insert/update, so concurrent readers never observe two default
/// records for one (field, locale) pair.
use crate::modules::settings::domain::entities::{SettingChanges, SettingDraft, SettingRecord};
use crate::modules::settings::domain::repository::{SettingsFilter, SettingsRepository};
use crate::modules::settings::domain::value_objects::SettingField;
use crate::modules::settings::infrastructure::models::{
    NewSettingRow, SettingChangeset, SettingModel,
};
use crate::schema::settings;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::infrastructure::database::DbPool;
use async_trait::async_trait;
use diesel::prelude::*;
use tokio::task;

pub struct SettingsRepositoryImpl {
    pool: DbPool,
}

impl SettingsRepositoryImpl {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SettingsRepositoryImpl {
    async fn find_for_locale(
        &self,
        field: SettingField,
        locale: &str,
    ) -> AppResult<Option<SettingRecord>> {
        let pool = self.pool.clone();
        let locale = locale.to_string();

        let row = task::spawn_blocking(move || -> AppResult<Option<SettingModel>> {
            let mut conn = pool.get()?;
            let m = settings::table
                .filter(settings::field.eq(field.as_str()))
                .filter(settings::locale.eq(locale))
                .filter(settings::is_active.eq(true))
                .order(settings::is_default.desc())
                .select(SettingModel::as_select())
                .first(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        row.map(SettingModel::into_record).transpose()
    }

    async fn find_default_any_locale(
        &self,
        field: SettingField,
    ) -> AppResult<Option<SettingRecord>> {
        let pool = self.pool.clone();

        let row = task::spawn_blocking(move || -> AppResult<Option<SettingModel>> {
            let mut conn = pool.get()?;
            let m = settings::table
                .filter(settings::field.eq(field.as_str()))
                .filter(settings::is_active.eq(true))
                .filter(settings::is_default.eq(true))
                .order(settings::settings_id.asc())
                .select(SettingModel::as_select())
                .first(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        row.map(SettingModel::into_record).transpose()
    }

    async fn find_first_active(&self, field: SettingField) -> AppResult<Option<SettingRecord>> {
        let pool = self.pool.clone();

        let row = task::spawn_blocking(move || -> AppResult<Option<SettingModel>> {
            let mut conn = pool.get()?;
            let m = settings::table
                .filter(settings::field.eq(field.as_str()))
                .filter(settings::is_active.eq(true))
                .order(settings::settings_id.asc())
                .select(SettingModel::as_select())
                .first(&mut conn)
                .optional()?;
            Ok(m)
        })
        .await??;

        row.map(SettingModel::into_record).transpose()
    }

    async fn list(
        &self,
        filter: &SettingsFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<SettingRecord>, u64)> {
        let pool = self.pool.clone();
        let field = filter.field;
        let locale = filter.locale.clone();
        let is_active = filter.is_active;

        let (rows, total) =
            task::spawn_blocking(move || -> AppResult<(Vec<SettingModel>, i64)> {
                let mut conn = pool.get()?;

                let mut query = settings::table.into_boxed();
                let mut count_query = settings::table.into_boxed();

                if let Some(field) = field {
                    query = query.filter(settings::field.eq(field.as_str()));
                    count_query = count_query.filter(settings::field.eq(field.as_str()));
                }
                if let Some(locale) = locale {
                    query = query.filter(settings::locale.eq(locale.clone()));
                    count_query = count_query.filter(settings::locale.eq(locale));
                }
                if let Some(is_active) = is_active {
                    query = query.filter(settings::is_active.eq(is_active));
                    count_query = count_query.filter(settings::is_active.eq(is_active));
                }

                let total = count_query.count().get_result::<i64>(&mut conn)?;

                let rows = query
                    .order((
                        settings::field.asc(),
                        settings::locale.asc(),
                        settings::settings_id.asc(),
                    ))
                    .offset(offset)
                    .limit(limit)
                    .select(SettingModel::as_select())
                    .load::<SettingModel>(&mut conn)?;

                Ok((rows, total))
            })
            .await??;

        let records = rows
            .into_iter()
            .map(SettingModel::into_record)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((records, total as u64))
    }

    async fn insert(&self, draft: SettingDraft) -> AppResult<SettingRecord> {
        let pool = self.pool.clone();

        let inserted = task::spawn_blocking(move || -> AppResult<SettingModel> {
            let mut conn = pool.get()?;
            let row = NewSettingRow::from(draft);

            conn.transaction::<SettingModel, AppError, _>(|conn| {
                if row.is_default {
                    diesel::update(
                        settings::table
                            .filter(settings::field.eq(&row.field))
                            .filter(settings::locale.eq(&row.locale))
                            .filter(settings::is_active.eq(true)),
                    )
                    .set(settings::is_default.eq(false))
                    .execute(conn)?;
                }

                let inserted = diesel::insert_into(settings::table)
                    .values(&row)
                    .returning(SettingModel::as_returning())
                    .get_result(conn)?;
                Ok(inserted)
            })
        })
        .await??;

        inserted.into_record()
    }

    async fn update(&self, settings_id: i32, changes: SettingChanges) -> AppResult<SettingRecord> {
        let pool = self.pool.clone();

        let updated = task::spawn_blocking(move || -> AppResult<SettingModel> {
            let mut conn = pool.get()?;

            conn.transaction::<SettingModel, AppError, _>(|conn| {
                let existing: SettingModel = settings::table
                    .find(settings_id)
                    .select(SettingModel::as_select())
                    .first(conn)
                    .map_err(|e| match e {
                        diesel::result::Error::NotFound => {
                            AppError::NotFound(format!("Setting {} not found", settings_id))
                        }
                        other => other.into(),
                    })?;

                if changes.is_default == Some(true) {
                    // Sibling group is keyed on the post-update locale
                    let locale = changes
                        .locale
                        .clone()
                        .unwrap_or_else(|| existing.locale.clone());
                    diesel::update(
                        settings::table
                            .filter(settings::field.eq(&existing.field))
                            .filter(settings::locale.eq(locale))
                            .filter(settings::settings_id.ne(settings_id))
                            .filter(settings::is_active.eq(true)),
                    )
                    .set(settings::is_default.eq(false))
                    .execute(conn)?;
                }

                let changeset = SettingChangeset::from(changes);
                let updated = diesel::update(settings::table.find(settings_id))
                    .set(&changeset)
                    .returning(SettingModel::as_returning())
                    .get_result(conn)?;
                Ok(updated)
            })
        })
        .await??;

        updated.into_record()
    }

    async fn delete(&self, settings_id: i32) -> AppResult<bool> {
        let pool = self.pool.clone();

        let deleted = task::spawn_blocking(move || -> AppResult<usize> {
            let mut conn = pool.get()?;
            let n = diesel::delete(settings::table.find(settings_id)).execute(&mut conn)?;
            Ok(n)
        })
        .await??;

        Ok(deleted > 0)
    }
}
