pub mod business_day;
pub mod menu;
pub mod orders;
pub mod print;
pub mod purchases;
pub mod sales;
pub mod stats;

use crate::db::Database;
use crate::error::AppError;
use crate::models::BusinessDay;
use rusqlite::{Connection, OptionalExtension, Row};
use std::sync::MutexGuard;

pub(crate) fn lock(db: &Database) -> Result<MutexGuard<'_, Connection>, AppError> {
    db.conn
        .lock()
        .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
}

pub(crate) fn now_str() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn today_str() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

pub(crate) fn map_business_day(row: &Row) -> rusqlite::Result<BusinessDay> {
    Ok(BusinessDay {
        id: row.get(0)?,
        business_date: row.get(1)?,
        opened_at: row.get(2)?,
        closed_at: row.get(3)?,
        is_open: row.get::<_, i64>(4)? != 0,
    })
}

/// The single open business day, if any. Callers use this as the
/// precondition gate for order and purchase creation.
pub(crate) fn find_open_day(conn: &Connection) -> Result<Option<BusinessDay>, AppError> {
    let day = conn
        .query_row(
            "SELECT id, business_date, opened_at, closed_at, is_open
             FROM business_days WHERE is_open = 1",
            [],
            map_business_day,
        )
        .optional()?;
    Ok(day)
}
