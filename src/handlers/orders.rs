use crate::error::AppError;
use crate::models::{
    FinalizeBill, Order, OrderFilter, OrderLine, OrderStatus, PlaceOrder, UpdateOrderStatus,
};
use crate::{printer, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use serde::Serialize;

use super::{find_open_day, lock};

const ORDER_COLUMNS: &str = "o.id, o.order_id, o.order_type, o.items, o.total_bill, o.discount,
     o.service_charges, o.delivery_charges, o.net_bill, o.status, o.customer_phone,
     o.table_no, o.business_day_id, o.created_at";

fn map_order(row: &Row) -> rusqlite::Result<Order> {
    let items_json: String = row.get(3)?;
    let items: Vec<OrderLine> = serde_json::from_str(&items_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(Order {
        id: row.get(0)?,
        order_id: row.get(1)?,
        order_type: row.get(2)?,
        items,
        total_bill: row.get(4)?,
        discount: row.get(5)?,
        service_charges: row.get(6)?,
        delivery_charges: row.get(7)?,
        net_bill: row.get(8)?,
        status: row.get(9)?,
        customer_phone: row.get(10)?,
        table_no: row.get(11)?,
        business_day_id: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn order_by_id(conn: &Connection, id: i64) -> Result<Order, AppError> {
    conn.query_row(
        &format!("SELECT {} FROM orders o WHERE o.id = ?1", ORDER_COLUMNS),
        [id],
        map_order,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

/// Hint for the next display order id: the latest order's id with its fixed
/// 3-character prefix stripped. Purely advisory; nothing is reserved.
pub async fn next_order_id(
    State(state): State<AppState>,
) -> Result<Json<Option<String>>, AppError> {
    let conn = lock(&state.db)?;

    let latest: Option<String> = conn
        .query_row(
            "SELECT order_id FROM orders ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(Json(latest.map(|id| id.chars().skip(3).collect())))
}

pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let conn = lock(&state.db)?;

    let day = find_open_day(&conn)?
        .ok_or_else(|| AppError::Precondition("No business day is open".to_string()))?;

    let items_json = serde_json::to_string(&payload.items)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Orders always start as 'created'; billing may adjust charges later.
    conn.execute(
        "INSERT INTO orders (order_id, order_type, items, total_bill, discount,
             service_charges, delivery_charges, net_bill, status, customer_phone,
             table_no, business_day_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 'created', ?9, ?10, ?11)",
        rusqlite::params![
            payload.order_id,
            payload.order_type,
            items_json,
            payload.total_bill,
            payload.discount,
            payload.service_charges,
            payload.delivery_charges,
            payload.net_bill,
            payload.customer_phone,
            payload.table_no,
            day.id,
        ],
    )?;

    let order = order_by_id(&conn, conn.last_insert_rowid())?;
    tracing::info!(
        order_id = %order.order_id,
        business_day_id = day.id,
        total_bill = order.total_bill,
        "Order placed"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>, AppError> {
    let conn = lock(&state.db)?;

    let mut sql = format!(
        "SELECT {} FROM orders o
         JOIN business_days b ON o.business_day_id = b.id
         WHERE 1=1",
        ORDER_COLUMNS
    );
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(status) = &filter.status {
        sql.push_str(" AND o.status = ?");
        params.push(Box::new(status.clone()));
    }
    if let Some(order_type) = &filter.order_type {
        sql.push_str(" AND o.order_type = ?");
        params.push(Box::new(order_type.clone()));
    }
    if let Some(item) = &filter.item {
        sql.push_str(" AND LOWER(o.items) LIKE ?");
        params.push(Box::new(format!("%{}%", item.to_lowercase())));
    }
    if let (Some(from), Some(to)) = (&filter.from_date, &filter.to_date) {
        sql.push_str(" AND b.business_date BETWEEN ? AND ?");
        params.push(Box::new(from.clone()));
        params.push(Box::new(to.clone()));
    }
    sql.push_str(" ORDER BY o.id DESC");

    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let orders = stmt
        .query_map(&param_refs[..], map_order)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(orders))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatus>,
) -> Result<Json<Order>, AppError> {
    let conn = lock(&state.db)?;

    let order = order_by_id(&conn, id)?;

    let current = OrderStatus::parse(&order.status)
        .ok_or_else(|| AppError::Internal(format!("unknown stored status: {}", order.status)))?;
    let next = OrderStatus::parse(&payload.status)
        .ok_or_else(|| AppError::Validation("Invalid status value".to_string()))?;

    if !current.can_transition_to(next) {
        return Err(AppError::Validation("Invalid status transition".to_string()));
    }

    conn.execute(
        "UPDATE orders SET status = ?1 WHERE id = ?2",
        rusqlite::params![next.as_str(), id],
    )?;

    let order = order_by_id(&conn, id)?;
    tracing::info!(order_id = %order.order_id, status = %order.status, "Order status updated");

    Ok(Json(order))
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub message: String,
    pub order_id: String,
    pub net_bill: f64,
    pub cash_received: f64,
    pub change_due: f64,
}

/// Store the final bill figures, then print the customer receipt.
/// The bill update commits before printing; a printer failure is reported
/// as a 500 but never rolls the stored bill back.
pub async fn finalize_bill(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<FinalizeBill>,
) -> Result<Json<BillResponse>, AppError> {
    let order = {
        let conn = lock(&state.db)?;

        // Existence check first so a bad id is a 404, not a silent no-op
        order_by_id(&conn, id)?;

        conn.execute(
            "UPDATE orders SET discount = ?1, service_charges = ?2,
                 delivery_charges = ?3, net_bill = ?4
             WHERE id = ?5",
            rusqlite::params![
                payload.discount.unwrap_or(0.0),
                payload.service_charges.unwrap_or(0.0),
                payload.delivery_charges.unwrap_or(0.0),
                payload.net_bill,
                id,
            ],
        )?;

        order_by_id(&conn, id)?
    };

    let cash = payload.cash;
    let change = payload.change.unwrap_or(cash - order.net_bill);

    tracing::info!(order_id = %order.order_id, net_bill = order.net_bill, "Bill stored");

    let ticket = printer::render_receipt(&state.config, &order, cash, change);
    if let Err(e) = printer::print(&state.config, &ticket) {
        tracing::error!(order_id = %order.order_id, error = %e, "Receipt print failed");
        return Err(e);
    }

    Ok(Json(BillResponse {
        message: "Printed successfully".to_string(),
        order_id: order.order_id,
        net_bill: order.net_bill,
        cash_received: cash,
        change_due: change,
    }))
}
