use crate::error::AppError;
use crate::models::{DailySalesQuery, DaySales, PeriodFilter};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use rusqlite::{Connection, OptionalExtension};

use super::lock;
use super::purchases::push_period_filter;

/// Closed-order sum and count attributed to one business day.
pub(crate) fn closed_totals_for_day(
    conn: &Connection,
    business_day_id: i64,
) -> Result<(f64, i64), AppError> {
    let totals = conn.query_row(
        "SELECT COALESCE(SUM(net_bill), 0), COUNT(*)
         FROM orders WHERE status = 'closed' AND business_day_id = ?1",
        [business_day_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(totals)
}

/// Single-day lookup by explicit date. A date with no business day is an
/// empty result, not an error.
pub async fn daily(
    State(state): State<AppState>,
    Query(query): Query<DailySalesQuery>,
) -> Result<Json<DaySales>, AppError> {
    let conn = lock(&state.db)?;

    let day: Option<(i64, String)> = conn
        .query_row(
            "SELECT id, business_date FROM business_days WHERE business_date = ?1",
            [&query.date],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let sales = match day {
        Some((day_id, business_date)) => {
            let (total_sale, order_count) = closed_totals_for_day(&conn, day_id)?;
            DaySales {
                date: business_date,
                total_sale: total_sale as i64,
                order_count,
            }
        }
        None => DaySales {
            date: query.date,
            total_sale: 0,
            order_count: 0,
        },
    };

    Ok(Json(sales))
}

/// Sales history over business days, newest first. Filters apply to the
/// business date with the same precedence as the purchase listing.
pub async fn history(
    State(state): State<AppState>,
    Query(filter): Query<PeriodFilter>,
) -> Result<Json<Vec<DaySales>>, AppError> {
    let conn = lock(&state.db)?;

    let mut sql = "SELECT id, business_date FROM business_days WHERE 1=1".to_string();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    push_period_filter(&filter, "business_date", &mut sql, &mut params);
    sql.push_str(" ORDER BY business_date DESC, id DESC");

    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let days = stmt
        .query_map(&param_refs[..], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut sales = Vec::with_capacity(days.len());
    for (day_id, business_date) in days {
        let (total_sale, order_count) = closed_totals_for_day(&conn, day_id)?;
        sales.push(DaySales {
            date: business_date,
            total_sale: total_sale as i64,
            order_count,
        });
    }

    Ok(Json(sales))
}
