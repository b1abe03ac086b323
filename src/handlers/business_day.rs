use crate::error::AppError;
use crate::models::BusinessDay;
use crate::AppState;
use axum::{extract::State, Json};
use rusqlite::OptionalExtension;

use super::{find_open_day, lock, map_business_day, now_str, today_str};

fn day_by_id(conn: &rusqlite::Connection, id: i64) -> Result<BusinessDay, AppError> {
    let day = conn.query_row(
        "SELECT id, business_date, opened_at, closed_at, is_open
         FROM business_days WHERE id = ?1",
        [id],
        map_business_day,
    )?;
    Ok(day)
}

/// Open the business day. Reuses today's closed row when one exists so a
/// reopened day keeps a single row for its date.
pub async fn open_day(State(state): State<AppState>) -> Result<Json<BusinessDay>, AppError> {
    let conn = lock(&state.db)?;

    if find_open_day(&conn)?.is_some() {
        return Err(AppError::Conflict("Business day already opened".to_string()));
    }

    let today = today_str();
    let now = now_str();

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM business_days WHERE business_date = ?1 AND is_open = 0",
            [&today],
            |row| row.get(0),
        )
        .optional()?;

    let id = match existing {
        Some(id) => {
            conn.execute(
                "UPDATE business_days SET opened_at = ?1, is_open = 1 WHERE id = ?2",
                rusqlite::params![now, id],
            )?;
            id
        }
        None => {
            conn.execute(
                "INSERT INTO business_days (business_date, opened_at, is_open) VALUES (?1, ?2, 1)",
                rusqlite::params![today, now],
            )?;
            conn.last_insert_rowid()
        }
    };

    let day = day_by_id(&conn, id)?;
    tracing::info!(business_day_id = day.id, date = %day.business_date, "Business day opened");

    Ok(Json(day))
}

pub async fn close_day(State(state): State<AppState>) -> Result<Json<BusinessDay>, AppError> {
    let conn = lock(&state.db)?;

    let day = find_open_day(&conn)?
        .ok_or_else(|| AppError::Precondition("No business day is open".to_string()))?;

    conn.execute(
        "UPDATE business_days SET closed_at = ?1, is_open = 0 WHERE id = ?2",
        rusqlite::params![now_str(), day.id],
    )?;

    let day = day_by_id(&conn, day.id)?;
    tracing::info!(business_day_id = day.id, date = %day.business_date, "Business day closed");

    Ok(Json(day))
}

pub async fn current(State(state): State<AppState>) -> Result<Json<BusinessDay>, AppError> {
    let conn = lock(&state.db)?;

    let day = find_open_day(&conn)?
        .ok_or_else(|| AppError::NotFound("No business day is open".to_string()))?;

    Ok(Json(day))
}
