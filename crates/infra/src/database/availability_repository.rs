//! SQLite-backed implementation of the AvailabilityRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use rusqlite::{params, Row};
use slotbook_core::AvailabilityRepository;
use slotbook_domain::{AvailabilityRule, AvailabilityUpdate, Result, RuleId, UserId};
use tracing::{debug, instrument};

use super::manager::{map_sql_error, DbManager};

/// SQLite implementation of AvailabilityRepository.
pub struct SqliteAvailabilityRepository {
    db: Arc<DbManager>,
}

impl SqliteAvailabilityRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<AvailabilityRule> {
    Ok(AvailabilityRule {
        id: parse_id(row, 0)?,
        user_id: parse_id(row, 1)?,
        day_of_week: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn parse_id<T: std::str::FromStr>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|err: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
    })
}

const SELECT_COLUMNS: &str = "id, user_id, day_of_week, start_time, end_time, created_at";

#[async_trait]
impl AvailabilityRepository for SqliteAvailabilityRepository {
    #[instrument(skip(self))]
    async fn rules_for_user(&self, user_id: UserId) -> Result<Vec<AvailabilityRule>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM availability_rules \
                 WHERE user_id = ?1 \
                 ORDER BY day_of_week ASC, start_time ASC"
            ))
            .map_err(map_sql_error)?;

        let rules = stmt
            .query_map(params![user_id.to_string()], map_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        Ok(rules)
    }

    #[instrument(skip(self))]
    async fn rules_for_day(
        &self,
        user_id: UserId,
        day_of_week: u8,
    ) -> Result<Vec<AvailabilityRule>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM availability_rules \
                 WHERE user_id = ?1 AND day_of_week = ?2 \
                 ORDER BY start_time ASC"
            ))
            .map_err(map_sql_error)?;

        let rules = stmt
            .query_map(params![user_id.to_string(), day_of_week], map_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        Ok(rules)
    }

    #[instrument(skip(self, windows), fields(window_count = windows.len()))]
    async fn replace_all(
        &self,
        user_id: UserId,
        windows: &[AvailabilityUpdate],
    ) -> Result<Vec<AvailabilityRule>> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(map_sql_error)?;

        let now = Local::now().naive_local();

        tx.execute(
            "DELETE FROM availability_rules WHERE user_id = ?1",
            params![user_id.to_string()],
        )
        .map_err(map_sql_error)?;

        let mut created = Vec::with_capacity(windows.len());
        for window in windows {
            let rule = AvailabilityRule {
                id: RuleId::new(),
                user_id,
                day_of_week: window.day_of_week,
                start_time: window.start_time,
                end_time: window.end_time,
                created_at: now,
            };

            tx.execute(
                "INSERT INTO availability_rules (
                    id, user_id, day_of_week, start_time, end_time, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    rule.id.to_string(),
                    rule.user_id.to_string(),
                    rule.day_of_week,
                    rule.start_time,
                    rule.end_time,
                    rule.created_at,
                ],
            )
            .map_err(map_sql_error)?;

            created.push(rule);
        }

        tx.commit().map_err(map_sql_error)?;

        debug!(user_id = %user_id, rule_count = created.len(), "availability rules replaced");
        created.sort_by_key(|rule| (rule.day_of_week, rule.start_time));
        Ok(created)
    }
}
