//! SQLite-backed implementation of the AppointmentRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Row, ToSql};
use slotbook_core::AppointmentRepository;
use slotbook_domain::{Appointment, AppointmentId, Result, SlotbookError, UserId};
use tracing::{debug, instrument};

use super::manager::{map_sql_error, DbManager};

/// SQLite implementation of AppointmentRepository.
pub struct SqliteAppointmentRepository {
    db: Arc<DbManager>,
}

impl SqliteAppointmentRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: parse_id(row, 0)?,
        user_id: parse_id(row, 1)?,
        customer_name: row.get(2)?,
        start_time: row.get(3)?,
        duration_minutes: row.get(4)?,
        external_booking_id: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
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

const SELECT_COLUMNS: &str = "id, user_id, customer_name, start_time, duration_minutes, \
                              external_booking_id, created_at, updated_at";

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn insert(&self, appointment: &Appointment) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "INSERT INTO appointments (
                id, user_id, customer_name, start_time, duration_minutes,
                external_booking_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                appointment.id.to_string(),
                appointment.user_id.to_string(),
                appointment.customer_name,
                appointment.start_time,
                appointment.duration_minutes,
                appointment.external_booking_id,
                appointment.created_at,
                appointment.updated_at,
            ],
        )
        .map_err(map_sql_error)?;

        debug!(appointment_id = %appointment.id, "appointment inserted");
        Ok(())
    }

    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn update(&self, appointment: &Appointment) -> Result<()> {
        let conn = self.db.get_connection()?;

        let affected = conn
            .execute(
                "UPDATE appointments SET
                    customer_name = ?1,
                    start_time = ?2,
                    duration_minutes = ?3,
                    external_booking_id = ?4,
                    updated_at = ?5
                 WHERE id = ?6 AND user_id = ?7",
                params![
                    appointment.customer_name,
                    appointment.start_time,
                    appointment.duration_minutes,
                    appointment.external_booking_id,
                    appointment.updated_at,
                    appointment.id.to_string(),
                    appointment.user_id.to_string(),
                ],
            )
            .map_err(map_sql_error)?;

        // Zero affected rows means the record vanished between the caller's
        // read and this write; reporting success here would be a lie.
        if affected == 0 {
            return Err(SlotbookError::NotFound(format!(
                "appointment {} not found",
                appointment.id
            )));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user: UserId, id: AppointmentId) -> Result<bool> {
        let conn = self.db.get_connection()?;

        let affected = conn
            .execute(
                "DELETE FROM appointments WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), user.to_string()],
            )
            .map_err(map_sql_error)?;

        Ok(affected > 0)
    }

    #[instrument(skip(self))]
    async fn find(&self, user: UserId, id: AppointmentId) -> Result<Option<Appointment>> {
        let conn = self.db.get_connection()?;

        let result = conn.query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM appointments WHERE id = ?1 AND user_id = ?2"),
            params![id.to_string(), user.to_string()],
            map_row,
        );

        match result {
            Ok(appointment) => Ok(Some(appointment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => Err(map_sql_error(err)),
        }
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        user: UserId,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Result<Vec<Appointment>> {
        let conn = self.db.get_connection()?;

        let user = user.to_string();
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM appointments WHERE user_id = ?1");
        let mut params: Vec<&dyn ToSql> = vec![&user];

        if let Some(from) = from.as_ref() {
            sql.push_str(&format!(" AND start_time >= ?{}", params.len() + 1));
            params.push(from);
        }
        if let Some(to) = to.as_ref() {
            sql.push_str(&format!(" AND start_time <= ?{}", params.len() + 1));
            params.push(to);
        }
        sql.push_str(" ORDER BY start_time ASC");

        let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params.as_slice(), map_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn list_after(&self, user: UserId, after: NaiveDateTime) -> Result<Vec<Appointment>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM appointments \
                 WHERE user_id = ?1 AND start_time > ?2 \
                 ORDER BY start_time ASC"
            ))
            .map_err(map_sql_error)?;

        let rows = stmt
            .query_map(params![user.to_string(), after], map_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn set_external_booking_id(
        &self,
        user: UserId,
        id: AppointmentId,
        external_id: &str,
    ) -> Result<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            "UPDATE appointments SET external_booking_id = ?1 WHERE id = ?2 AND user_id = ?3",
            params![external_id, id.to_string(), user.to_string()],
        )
        .map_err(map_sql_error)?;

        Ok(())
    }
}
