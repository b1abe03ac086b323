//! Dashboard statistics. Every sales figure counts closed orders only;
//! purchases have no status and are summed as-is.

use crate::error::AppError;
use crate::models::{DailySalesTrend, MonthlyOrderCounts, MonthlyTotal, WeekDaySales, WeeklySales};
use crate::AppState;
use axum::{extract::State, Json};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rusqlite::Connection;

use super::lock;

fn current_month() -> String {
    Local::now().format("%Y-%m").to_string()
}

fn closed_totals_for_date(conn: &Connection, date: &NaiveDate) -> Result<(f64, i64), AppError> {
    let totals = conn.query_row(
        "SELECT COALESCE(SUM(net_bill), 0), COUNT(*)
         FROM orders
         WHERE status = 'closed' AND date(created_at, 'localtime') = ?1",
        [date.format("%Y-%m-%d").to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(totals)
}

pub async fn monthly_sales(State(state): State<AppState>) -> Result<Json<MonthlyTotal>, AppError> {
    let conn = lock(&state.db)?;

    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(net_bill), 0) FROM orders
         WHERE status = 'closed'
           AND strftime('%Y-%m', created_at, 'localtime') = ?1",
        [current_month()],
        |row| row.get(0),
    )?;

    Ok(Json(MonthlyTotal {
        total: total as i64,
    }))
}

pub async fn monthly_purchases(
    State(state): State<AppState>,
) -> Result<Json<MonthlyTotal>, AppError> {
    let conn = lock(&state.db)?;

    let total: f64 = conn.query_row(
        "SELECT COALESCE(SUM(total_bill), 0) FROM purchases
         WHERE strftime('%Y-%m', created_at, 'localtime') = ?1",
        [current_month()],
        |row| row.get(0),
    )?;

    Ok(Json(MonthlyTotal {
        total: total as i64,
    }))
}

/// Closed-order counts for the running month, bucketed by the three
/// recognized order types. Anything else lands in no bucket.
pub async fn monthly_orders(
    State(state): State<AppState>,
) -> Result<Json<MonthlyOrderCounts>, AppError> {
    let conn = lock(&state.db)?;
    let month = current_month();

    let mut count_for = |order_type: &str| -> Result<i64, AppError> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM orders
             WHERE status = 'closed'
               AND strftime('%Y-%m', created_at, 'localtime') = ?1
               AND order_type = ?2",
            rusqlite::params![month, order_type],
            |row| row.get(0),
        )?;
        Ok(count)
    };

    let delivery = count_for("delivery")?;
    let dine_in = count_for("dine_in")?;
    let takeaway = count_for("takeaway")?;

    Ok(Json(MonthlyOrderCounts {
        delivery,
        dine_in,
        takeaway,
    }))
}

/// One entry per day of the current week, Monday through Sunday.
/// Days without closed orders report zero with has_sales = false.
pub async fn weekly_sales(State(state): State<AppState>) -> Result<Json<WeeklySales>, AppError> {
    let conn = lock(&state.db)?;

    let today = Local::now().date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);

    let mut days = Vec::with_capacity(7);
    let mut week_total = 0.0;

    for offset in 0..7 {
        let date = monday + Duration::days(offset);
        let (total, count) = closed_totals_for_date(&conn, &date)?;
        week_total += total;
        days.push(WeekDaySales {
            date: date.format("%Y-%m-%d").to_string(),
            total,
            has_sales: count > 0,
        });
    }

    Ok(Json(WeeklySales {
        week_start: monday.format("%Y-%m-%d").to_string(),
        days,
        week_total,
    }))
}

/// Today's closed sales against yesterday's, with a percentage trend.
/// The trend is zero when yesterday had no sales, not a division by zero.
pub async fn daily_sales(
    State(state): State<AppState>,
) -> Result<Json<DailySalesTrend>, AppError> {
    let conn = lock(&state.db)?;

    let today = Local::now().date_naive();
    let yesterday = today - Duration::days(1);

    let (today_total, today_count) = closed_totals_for_date(&conn, &today)?;
    let (prev_total, prev_count) = closed_totals_for_date(&conn, &yesterday)?;

    let trend = if prev_total == 0.0 {
        0.0
    } else {
        ((today_total - prev_total) / prev_total * 100.0 * 10.0).round() / 10.0
    };

    Ok(Json(DailySalesTrend {
        date: today.format("%Y-%m-%d").to_string(),
        total_sale: today_total,
        order_count: today_count,
        previous_date: yesterday.format("%Y-%m-%d").to_string(),
        previous_total_sale: prev_total,
        previous_order_count: prev_count,
        trend,
    }))
}
