use crate::error::AppError;
use crate::models::{
    CreatePurchaseCategory, PeriodFilter, Purchase, PurchaseCategory, PurchaseItem,
};
use crate::{storage, AppState};
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use rusqlite::{types::Type, Connection, OptionalExtension, Row};

use super::{find_open_day, lock};

fn map_purchase(row: &Row) -> rusqlite::Result<Purchase> {
    let items_json: String = row.get(3)?;
    let items: Vec<PurchaseItem> = serde_json::from_str(&items_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(Purchase {
        id: row.get(0)?,
        purchase_category_id: row.get(1)?,
        category_name: row.get(2)?,
        items,
        total_bill: row.get(4)?,
        bill_image: row.get(5)?,
        business_day_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn purchase_by_id(conn: &Connection, id: i64) -> Result<Purchase, AppError> {
    conn.query_row(
        "SELECT p.id, p.purchase_category_id, c.name, p.items, p.total_bill,
                p.bill_image, p.business_day_id, p.created_at
         FROM purchases p
         LEFT JOIN purchase_categories c ON p.purchase_category_id = c.id
         WHERE p.id = ?1",
        [id],
        map_purchase,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("Purchase not found".to_string()))
}

/// Append a period filter on `date(<column>, 'localtime')`.
/// Precedence: date range, then month + year, then year, then nothing.
pub(crate) fn push_period_filter(
    filter: &PeriodFilter,
    column: &str,
    sql: &mut String,
    params: &mut Vec<Box<dyn rusqlite::ToSql>>,
) {
    if let (Some(from), Some(to)) = (&filter.from_date, &filter.to_date) {
        sql.push_str(&format!(" AND {} BETWEEN ? AND ?", column));
        params.push(Box::new(from.clone()));
        params.push(Box::new(to.clone()));
    } else if let (Some(month), Some(year)) = (filter.month, filter.year) {
        sql.push_str(&format!(
            " AND CAST(strftime('%m', {}) AS INTEGER) = ? AND CAST(strftime('%Y', {}) AS INTEGER) = ?",
            column, column
        ));
        params.push(Box::new(month));
        params.push(Box::new(year));
    } else if let Some(year) = filter.year {
        sql.push_str(&format!(
            " AND CAST(strftime('%Y', {}) AS INTEGER) = ?",
            column
        ));
        params.push(Box::new(year));
    }
}

pub async fn list_purchases(
    State(state): State<AppState>,
    Query(filter): Query<PeriodFilter>,
) -> Result<Json<Vec<Purchase>>, AppError> {
    let conn = lock(&state.db)?;

    let mut sql = "SELECT p.id, p.purchase_category_id, c.name, p.items, p.total_bill,
                p.bill_image, p.business_day_id, p.created_at
         FROM purchases p
         LEFT JOIN purchase_categories c ON p.purchase_category_id = c.id
         WHERE 1=1"
        .to_string();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    push_period_filter(&filter, "date(p.created_at, 'localtime')", &mut sql, &mut params);
    sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");

    let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&sql)?;
    let purchases = stmt
        .query_map(&param_refs[..], map_purchase)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(purchases))
}

/// Multipart purchase entry: `purchase_category_id` and `items` (a JSON
/// array of {title, price}) as text fields, plus an optional `bill_image`
/// file. The total is always recomputed from the item prices.
pub async fn record_purchase(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Purchase>), AppError> {
    let mut category_id: Option<i64> = None;
    let mut items_raw: Option<String> = None;
    let mut bill_image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name().unwrap_or_default() {
            "purchase_category_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?;
                category_id = Some(text.trim().parse().map_err(|_| {
                    AppError::Validation("A valid purchase category is required".to_string())
                })?);
            }
            "items" => {
                items_raw = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Malformed multipart body: {}", e))
                })?);
            }
            "bill_image" => {
                let file_name = field.file_name().unwrap_or("bill").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Malformed multipart body: {}", e))
                })?;
                bill_image = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let conn = lock(&state.db)?;

    let day = find_open_day(&conn)?
        .ok_or_else(|| AppError::Precondition("No business day is open".to_string()))?;

    let items_raw = items_raw
        .ok_or_else(|| AppError::BadRequest("Invalid items JSON format".to_string()))?;
    let raw_items: Vec<serde_json::Value> = serde_json::from_str(&items_raw)
        .map_err(|_| AppError::BadRequest("Invalid items JSON format".to_string()))?;

    if raw_items.is_empty() {
        return Err(AppError::Validation(
            "At least one item is required".to_string(),
        ));
    }

    let category_id = category_id.ok_or_else(|| {
        AppError::Validation("A valid purchase category is required".to_string())
    })?;
    let category_exists: Option<i64> = conn
        .query_row(
            "SELECT id FROM purchase_categories WHERE id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .optional()?;
    if category_exists.is_none() {
        return Err(AppError::Validation(
            "A valid purchase category is required".to_string(),
        ));
    }

    // Validate each line and keep the caller's ordering
    let mut items: Vec<PurchaseItem> = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        let title = raw
            .get("title")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .unwrap_or_default();
        if title.is_empty() {
            return Err(AppError::Validation(format!(
                "Item title is required at index {}",
                index
            )));
        }

        let price = match raw.get("price") {
            Some(v) if v.is_number() => v.as_f64(),
            Some(v) => v.as_str().and_then(|s| s.trim().parse::<f64>().ok()),
            None => None,
        };
        let price = price.ok_or_else(|| {
            AppError::Validation(format!("Valid price is required at index {}", index))
        })?;

        items.push(PurchaseItem {
            title: title.to_string(),
            price,
        });
    }

    let total_bill: f64 = items.iter().map(|item| item.price).sum();

    let image_key = match bill_image {
        Some((file_name, bytes)) => Some(storage::store_bill_image(
            &state.config.upload_dir,
            &file_name,
            &bytes,
        )?),
        None => None,
    };

    let items_json = serde_json::to_string(&items)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    conn.execute(
        "INSERT INTO purchases (purchase_category_id, items, total_bill, bill_image, business_day_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![category_id, items_json, total_bill, image_key, day.id],
    )?;

    let purchase = purchase_by_id(&conn, conn.last_insert_rowid())?;
    tracing::info!(
        purchase_id = purchase.id,
        business_day_id = day.id,
        total_bill = purchase.total_bill,
        "Purchase recorded"
    );

    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn list_purchase_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<PurchaseCategory>>, AppError> {
    let conn = lock(&state.db)?;

    let mut stmt = conn.prepare("SELECT id, name FROM purchase_categories ORDER BY name")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(PurchaseCategory {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(categories))
}

pub async fn create_purchase_category(
    State(state): State<AppState>,
    Json(payload): Json<CreatePurchaseCategory>,
) -> Result<(StatusCode, Json<PurchaseCategory>), AppError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let conn = lock(&state.db)?;

    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM purchase_categories WHERE name = ?1",
            [&name],
            |row| row.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Err(AppError::Validation(
            "The name has already been taken".to_string(),
        ));
    }

    conn.execute(
        "INSERT INTO purchase_categories (name) VALUES (?1)",
        [&name],
    )?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseCategory {
            id: conn.last_insert_rowid(),
            name,
        }),
    ))
}
