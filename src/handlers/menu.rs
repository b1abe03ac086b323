//! Menu reference data: categories and items. Browsing only; none of the
//! ledger invariants apply here.

use crate::error::AppError;
use crate::models::{Category, CreateCategory, CreateItem, Item, MenuCategory};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rusqlite::{Connection, OptionalExtension, Row};

use super::lock;

fn map_item(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        price: row.get(3)?,
        status: row.get(4)?,
        description: row.get(5)?,
    })
}

fn item_by_id(conn: &Connection, id: i64) -> Result<Item, AppError> {
    conn.query_row(
        "SELECT id, category_id, name, price, status, description FROM items WHERE id = ?1",
        [id],
        map_item,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

/// Full menu: every category with its items.
pub async fn menu(State(state): State<AppState>) -> Result<Json<Vec<MenuCategory>>, AppError> {
    let conn = lock(&state.db)?;

    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
    let categories = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut result = Vec::with_capacity(categories.len());
    for (id, name) in categories {
        let mut item_stmt = conn.prepare(
            "SELECT id, category_id, name, price, status, description
             FROM items WHERE category_id = ?1 ORDER BY name",
        )?;
        let items = item_stmt
            .query_map([id], map_item)?
            .collect::<Result<Vec<_>, _>>()?;

        result.push(MenuCategory { id, name, items });
    }

    Ok(Json(result))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let conn = lock(&state.db)?;

    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let conn = lock(&state.db)?;

    let taken: Option<i64> = conn
        .query_row("SELECT id FROM categories WHERE name = ?1", [&name], |row| {
            row.get(0)
        })
        .optional()?;
    if taken.is_some() {
        return Err(AppError::Validation(
            "The name has already been taken".to_string(),
        ));
    }

    conn.execute("INSERT INTO categories (name) VALUES (?1)", [&name])?;

    Ok((
        StatusCode::CREATED,
        Json(Category {
            id: conn.last_insert_rowid(),
            name,
        }),
    ))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let conn = lock(&state.db)?;

    // Items fall with their category
    conn.execute("DELETE FROM items WHERE category_id = ?1", [id])?;
    let deleted = conn.execute("DELETE FROM categories WHERE id = ?1", [id])?;

    if deleted == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItem>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let status = payload.status.unwrap_or_else(|| "available".to_string());
    if status != "available" && status != "not-available" {
        return Err(AppError::Validation("Invalid item status".to_string()));
    }

    let conn = lock(&state.db)?;

    let category: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE id = ?1",
            [payload.category_id],
            |row| row.get(0),
        )
        .optional()?;
    if category.is_none() {
        return Err(AppError::Validation("A valid category is required".to_string()));
    }

    conn.execute(
        "INSERT INTO items (category_id, name, price, status, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![payload.category_id, name, payload.price, status, payload.description],
    )?;

    let item = item_by_id(&conn, conn.last_insert_rowid())?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, AppError> {
    let conn = lock(&state.db)?;
    Ok(Json(item_by_id(&conn, id)?))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CreateItem>,
) -> Result<Json<Item>, AppError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    let conn = lock(&state.db)?;

    // 404 before update so the caller can tell a bad id from a bad payload
    item_by_id(&conn, id)?;

    let status = payload.status.unwrap_or_else(|| "available".to_string());
    conn.execute(
        "UPDATE items SET category_id = ?1, name = ?2, price = ?3, status = ?4, description = ?5
         WHERE id = ?6",
        rusqlite::params![payload.category_id, name, payload.price, status, payload.description, id],
    )?;

    Ok(Json(item_by_id(&conn, id)?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let conn = lock(&state.db)?;

    let deleted = conn.execute("DELETE FROM items WHERE id = ?1", [id])?;
    if deleted == 0 {
        return Err(AppError::NotFound("Item not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
