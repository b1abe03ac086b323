use crate::models::OrderLine;
use crate::{printer, AppState};
use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub status: bool,
    pub message: String,
}

/// Kitchen ticket for an ad-hoc, not necessarily persisted, order payload.
/// Missing or malformed fields default to empty/zero instead of failing.
pub async fn kitchen_ticket(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<PrintResponse>, AppError> {
    let text = |key: &str| -> String {
        payload
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    let order_id = text("order_id");
    let order_type = text("order_type");
    let table_no = payload.get("table_no").and_then(|v| v.as_str());
    let customer_phone = payload.get("customer_phone").and_then(|v| v.as_str());

    let items: Vec<OrderLine> = payload
        .get("items")
        .and_then(|v| v.as_array())
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.is_object())
                .map(|entry| OrderLine {
                    item_name: entry
                        .get("item_name")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    item_type: entry
                        .get("type")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    qty: entry.get("qty").and_then(|v| v.as_i64()).unwrap_or(0),
                    line_total: entry
                        .get("line_total")
                        .and_then(|v| v.as_f64())
                        .unwrap_or(0.0),
                })
                .collect()
        })
        .unwrap_or_default();

    let ticket = printer::render_kitchen_ticket(
        &state.config,
        &order_id,
        &order_type,
        table_no,
        customer_phone,
        &items,
    );
    printer::print(&state.config, &ticket)?;

    tracing::info!(order_id = %order_id, "Kitchen ticket printed");

    Ok(Json(PrintResponse {
        status: true,
        message: "Printed successfully".to_string(),
    }))
}
