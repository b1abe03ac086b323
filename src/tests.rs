//! Handler-level tests against an in-memory SQLite database.

use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::handlers;
use crate::models::*;
use crate::printer;
use crate::storage;
use crate::AppState;
use axum::body::Body;
use axum::extract::{FromRequest, Multipart, Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::Json;
use std::sync::Arc;

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        db_path: ":memory:".to_string(),
        printer: None,
        upload_dir: std::env::temp_dir()
            .join(format!("restro-pos-test-{}", uuid::Uuid::new_v4()))
            .to_string_lossy()
            .to_string(),
        shop_name: "TEST SHOP".to_string(),
        shop_footer: vec!["THANK YOU!".to_string()],
    }
}

fn test_state() -> AppState {
    let db = Database::open_in_memory().expect("in-memory db");
    db.initialize().expect("schema");
    AppState {
        db: Arc::new(db),
        config: test_config(),
    }
}

async fn open_day(state: &AppState) -> BusinessDay {
    handlers::business_day::open_day(State(state.clone()))
        .await
        .expect("open day")
        .0
}

fn sample_items() -> Vec<OrderLine> {
    vec![
        OrderLine {
            item_name: "Chicken Karahi".to_string(),
            item_type: "Full".to_string(),
            qty: 1,
            line_total: 1200.0,
        },
        OrderLine {
            item_name: "Naan".to_string(),
            item_type: String::new(),
            qty: 4,
            line_total: 100.0,
        },
    ]
}

async fn place(state: &AppState, order_id: &str, order_type: &str, total: f64) -> Order {
    let payload = PlaceOrder {
        order_id: order_id.to_string(),
        order_type: order_type.to_string(),
        items: sample_items(),
        total_bill: total,
        discount: 0.0,
        service_charges: 0.0,
        delivery_charges: 0.0,
        net_bill: total,
        customer_phone: None,
        table_no: None,
    };
    let (status, Json(order)) = handlers::orders::place_order(State(state.clone()), Json(payload))
        .await
        .expect("place order");
    assert_eq!(status, StatusCode::CREATED);
    order
}

async fn set_status(state: &AppState, id: i64, status: &str) -> Result<Order, AppError> {
    handlers::orders::update_status(
        State(state.clone()),
        Path(id),
        Json(UpdateOrderStatus {
            status: status.to_string(),
        }),
    )
    .await
    .map(|json| json.0)
}

// ---------------------------------------------------------------- business day

#[tokio::test]
async fn open_day_creates_single_open_day() {
    let state = test_state();

    let day = open_day(&state).await;
    assert!(day.is_open);
    assert!(day.closed_at.is_none());

    let current = handlers::business_day::current(State(state.clone()))
        .await
        .expect("current")
        .0;
    assert_eq!(current.id, day.id);
}

#[tokio::test]
async fn opening_twice_is_a_conflict() {
    let state = test_state();
    open_day(&state).await;

    let err = handlers::business_day::open_day(State(state.clone()))
        .await
        .err()
        .expect("second open must fail");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn close_without_open_day_fails() {
    let state = test_state();

    let err = handlers::business_day::close_day(State(state.clone()))
        .await
        .err()
        .expect("close must fail");
    assert!(matches!(err, AppError::Precondition(_)));

    let err = handlers::business_day::current(State(state.clone()))
        .await
        .err()
        .expect("current must fail");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn reopening_same_date_reuses_the_row() {
    let state = test_state();

    let first = open_day(&state).await;
    let closed = handlers::business_day::close_day(State(state.clone()))
        .await
        .expect("close")
        .0;
    assert!(!closed.is_open);
    assert!(closed.closed_at.is_some());

    let reopened = open_day(&state).await;
    assert_eq!(reopened.id, first.id);

    let conn = state.db.conn.lock().unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM business_days", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

// ---------------------------------------------------------------------- orders

#[tokio::test]
async fn placing_order_requires_open_day() {
    let state = test_state();

    let payload = PlaceOrder {
        order_id: "ORD0001".to_string(),
        order_type: "dine_in".to_string(),
        items: sample_items(),
        total_bill: 1600.0,
        discount: 0.0,
        service_charges: 0.0,
        delivery_charges: 0.0,
        net_bill: 1600.0,
        customer_phone: None,
        table_no: Some("T1".to_string()),
    };
    let err = handlers::orders::place_order(State(state.clone()), Json(payload))
        .await
        .err()
        .expect("must fail without open day");
    assert!(matches!(err, AppError::Precondition(_)));
}

#[tokio::test]
async fn placed_order_starts_created_and_keeps_item_order() {
    let state = test_state();
    let day = open_day(&state).await;

    let order = place(&state, "ORD0001", "takeaway", 1600.0).await;
    assert_eq!(order.status, "created");
    assert_eq!(order.business_day_id, day.id);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].item_name, "Chicken Karahi");
    assert_eq!(order.items[0].item_type, "Full");
    assert_eq!(order.items[1].item_name, "Naan");
    assert_eq!(order.items[1].qty, 4);
}

#[tokio::test]
async fn next_order_id_strips_the_prefix() {
    let state = test_state();

    let empty = handlers::orders::next_order_id(State(state.clone()))
        .await
        .expect("next id")
        .0;
    assert_eq!(empty, None);

    open_day(&state).await;
    place(&state, "ORD0042", "takeaway", 500.0).await;

    let hint = handlers::orders::next_order_id(State(state.clone()))
        .await
        .expect("next id")
        .0;
    assert_eq!(hint.as_deref(), Some("0042"));
}

#[tokio::test]
async fn status_transitions_follow_the_lifecycle() {
    let state = test_state();
    open_day(&state).await;

    // created -> closed
    let order = place(&state, "ORD0001", "takeaway", 500.0).await;
    let closed = set_status(&state, order.id, "closed").await.expect("close");
    assert_eq!(closed.status, "closed");

    // closed -> created is not allowed
    let err = set_status(&state, order.id, "created").await.err().unwrap();
    assert!(matches!(err, AppError::Validation(_)));

    // closed -> cancelled voids the order
    let cancelled = set_status(&state, order.id, "cancelled").await.expect("void");
    assert_eq!(cancelled.status, "cancelled");

    // cancelled is terminal
    for next in ["created", "closed", "cancelled"] {
        let err = set_status(&state, order.id, next).await.err().unwrap();
        assert!(matches!(err, AppError::Validation(_)));
    }

    // created -> cancelled directly
    let order = place(&state, "ORD0002", "delivery", 700.0).await;
    let cancelled = set_status(&state, order.id, "cancelled").await.expect("cancel");
    assert_eq!(cancelled.status, "cancelled");

    // unknown status value
    let order = place(&state, "ORD0003", "dine_in", 300.0).await;
    let err = set_status(&state, order.id, "done").await.err().unwrap();
    assert!(matches!(err, AppError::Validation(_)));

    // unknown order id
    let err = set_status(&state, 9999, "closed").await.err().unwrap();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn order_listing_applies_filters() {
    let state = test_state();
    open_day(&state).await;

    let first = place(&state, "ORD0001", "dine_in", 500.0).await;
    place(&state, "ORD0002", "takeaway", 700.0).await;
    set_status(&state, first.id, "closed").await.unwrap();

    let all = handlers::orders::list_orders(
        State(state.clone()),
        Query(OrderFilter {
            status: None,
            order_type: None,
            item: None,
            from_date: None,
            to_date: None,
        }),
    )
    .await
    .expect("list")
    .0;
    assert_eq!(all.len(), 2);
    // newest first
    assert_eq!(all[0].order_id, "ORD0002");

    let closed_only = handlers::orders::list_orders(
        State(state.clone()),
        Query(OrderFilter {
            status: Some("closed".to_string()),
            order_type: None,
            item: None,
            from_date: None,
            to_date: None,
        }),
    )
    .await
    .expect("list")
    .0;
    assert_eq!(closed_only.len(), 1);
    assert_eq!(closed_only[0].order_id, "ORD0001");

    let takeaway = handlers::orders::list_orders(
        State(state.clone()),
        Query(OrderFilter {
            status: None,
            order_type: Some("takeaway".to_string()),
            item: None,
            from_date: None,
            to_date: None,
        }),
    )
    .await
    .expect("list")
    .0;
    assert_eq!(takeaway.len(), 1);

    // item match is a case-insensitive substring
    let karahi = handlers::orders::list_orders(
        State(state.clone()),
        Query(OrderFilter {
            status: None,
            order_type: None,
            item: Some("KARAHI".to_string()),
            from_date: None,
            to_date: None,
        }),
    )
    .await
    .expect("list")
    .0;
    assert_eq!(karahi.len(), 2);
}

#[tokio::test]
async fn finalize_bill_stores_figures_and_computes_change() {
    let mut state = test_state();
    // route printing to a plain file
    let printer_file = tempfile::NamedTempFile::new().unwrap();
    state.config.printer = Some(printer_file.path().to_string_lossy().to_string());

    open_day(&state).await;
    let order = place(&state, "ORD0001", "takeaway", 1000.0).await;

    let response = handlers::orders::finalize_bill(
        State(state.clone()),
        Path(order.id),
        Json(FinalizeBill {
            discount: Some(100.0),
            service_charges: None,
            delivery_charges: None,
            net_bill: 900.0,
            cash: 1000.0,
            change: None,
        }),
    )
    .await
    .expect("finalize")
    .0;

    assert_eq!(response.order_id, "ORD0001");
    assert_eq!(response.net_bill, 900.0);
    assert_eq!(response.cash_received, 1000.0);
    assert_eq!(response.change_due, 100.0);

    // figures persisted
    {
        let conn = state.db.conn.lock().unwrap();
        let (discount, net_bill): (f64, f64) = conn
            .query_row(
                "SELECT discount, net_bill FROM orders WHERE id = ?1",
                [order.id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(discount, 100.0);
        assert_eq!(net_bill, 900.0);
    }

    // the rendered ticket reached the device
    let written = std::fs::read(printer_file.path()).unwrap();
    assert!(written.starts_with(&[0x1B, b'@']));
    assert!(written.ends_with(&[0x1D, b'V', b'A', 3]));
}

#[tokio::test]
async fn finalize_bill_without_printer_keeps_the_stored_bill() {
    let state = test_state();
    open_day(&state).await;
    let order = place(&state, "ORD0001", "takeaway", 500.0).await;

    let err = handlers::orders::finalize_bill(
        State(state.clone()),
        Path(order.id),
        Json(FinalizeBill {
            discount: None,
            service_charges: None,
            delivery_charges: None,
            net_bill: 500.0,
            cash: 500.0,
            change: None,
        }),
    )
    .await
    .err()
    .expect("no printer configured");
    assert!(matches!(err, AppError::Dependency(_)));

    // the bill update committed before the print attempt
    let conn = state.db.conn.lock().unwrap();
    let net_bill: f64 = conn
        .query_row("SELECT net_bill FROM orders WHERE id = ?1", [order.id], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(net_bill, 500.0);
}

// ------------------------------------------------------------------- purchases

async fn multipart_from(boundary: &str, body: String) -> Multipart {
    let request = Request::builder()
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    Multipart::from_request(request, &()).await.unwrap()
}

fn purchase_body(boundary: &str, category_id: &str, items: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"purchase_category_id\"\r\n\r\n{cat}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"items\"\r\n\r\n{items}\r\n\
         --{b}--\r\n",
        b = boundary,
        cat = category_id,
        items = items
    )
}

async fn create_purchase_category(state: &AppState, name: &str) -> PurchaseCategory {
    handlers::purchases::create_purchase_category(
        State(state.clone()),
        Json(CreatePurchaseCategory {
            name: name.to_string(),
        }),
    )
    .await
    .expect("create purchase category")
    .1
     .0
}

#[tokio::test]
async fn purchase_total_is_the_sum_of_item_prices() {
    let state = test_state();
    open_day(&state).await;
    let category = create_purchase_category(&state, "Vegetables").await;

    // prices arrive as numbers or numeric strings
    let items = r#"[{"title":"Tomatoes","price":100},{"title":"Onions","price":"250.5"}]"#;
    let multipart = multipart_from(
        "XBOUND",
        purchase_body("XBOUND", &category.id.to_string(), items),
    )
    .await;

    let (status, Json(purchase)) =
        handlers::purchases::record_purchase(State(state.clone()), multipart)
            .await
            .expect("record purchase");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(purchase.total_bill, 350.5);
    assert_eq!(purchase.items.len(), 2);
    assert_eq!(purchase.items[0].title, "Tomatoes");
    assert_eq!(purchase.items[1].price, 250.5);
    assert_eq!(purchase.category_name.as_deref(), Some("Vegetables"));
    assert!(purchase.bill_image.is_none());
}

#[tokio::test]
async fn purchase_requires_open_day_and_valid_items() {
    let state = test_state();
    let category_items = r#"[{"title":"Tomatoes","price":100}]"#;

    // no open day
    let multipart = multipart_from("B1", purchase_body("B1", "1", category_items)).await;
    let err = handlers::purchases::record_purchase(State(state.clone()), multipart)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppError::Precondition(_)));

    open_day(&state).await;
    let category = create_purchase_category(&state, "Meat").await;
    let cat = category.id.to_string();

    // malformed items JSON
    let multipart = multipart_from("B2", purchase_body("B2", &cat, "not json")).await;
    let err = handlers::purchases::record_purchase(State(state.clone()), multipart)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppError::BadRequest(_)));

    // empty items
    let multipart = multipart_from("B3", purchase_body("B3", &cat, "[]")).await;
    let err = handlers::purchases::record_purchase(State(state.clone()), multipart)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppError::Validation(_)));

    // unknown category
    let multipart = multipart_from("B4", purchase_body("B4", "999", category_items)).await;
    let err = handlers::purchases::record_purchase(State(state.clone()), multipart)
        .await
        .err()
        .unwrap();
    assert!(matches!(err, AppError::Validation(_)));

    // missing title names the offending index
    let multipart = multipart_from(
        "B5",
        purchase_body("B5", &cat, r#"[{"title":"ok","price":1},{"price":2}]"#),
    )
    .await;
    match handlers::purchases::record_purchase(State(state.clone()), multipart).await {
        Err(AppError::Validation(msg)) => assert!(msg.contains("index 1"), "{}", msg),
        _ => panic!("expected a validation error"),
    }

    // non-numeric price
    let multipart = multipart_from(
        "B6",
        purchase_body("B6", &cat, r#"[{"title":"ok","price":"abc"}]"#),
    )
    .await;
    match handlers::purchases::record_purchase(State(state.clone()), multipart).await {
        Err(AppError::Validation(msg)) => assert!(msg.contains("index 0"), "{}", msg),
        _ => panic!("expected a validation error"),
    }
}

#[tokio::test]
async fn purchase_category_names_are_unique() {
    let state = test_state();
    create_purchase_category(&state, "Dairy").await;

    let err = handlers::purchases::create_purchase_category(
        State(state.clone()),
        Json(CreatePurchaseCategory {
            name: "Dairy".to_string(),
        }),
    )
    .await
    .err()
    .expect("duplicate must fail");
    assert!(matches!(err, AppError::Validation(_)));

    let listed = handlers::purchases::list_purchase_categories(State(state.clone()))
        .await
        .expect("list")
        .0;
    assert_eq!(listed.len(), 1);
}

#[test]
fn period_filter_precedence() {
    // a date range wins over month and year
    let filter = PeriodFilter {
        from_date: Some("2026-01-01".to_string()),
        to_date: Some("2026-01-31".to_string()),
        month: Some(5),
        year: Some(2025),
    };
    let mut sql = String::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    handlers::purchases::push_period_filter(&filter, "business_date", &mut sql, &mut params);
    assert!(sql.contains("BETWEEN"));
    assert!(!sql.contains("strftime"));
    assert_eq!(params.len(), 2);

    // month + year
    let filter = PeriodFilter {
        from_date: None,
        to_date: None,
        month: Some(5),
        year: Some(2025),
    };
    let mut sql = String::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    handlers::purchases::push_period_filter(&filter, "business_date", &mut sql, &mut params);
    assert!(sql.contains("'%m'"));
    assert!(sql.contains("'%Y'"));
    assert_eq!(params.len(), 2);

    // year alone
    let filter = PeriodFilter {
        year: Some(2025),
        ..Default::default()
    };
    let mut sql = String::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    handlers::purchases::push_period_filter(&filter, "business_date", &mut sql, &mut params);
    assert!(sql.contains("'%Y'"));
    assert!(!sql.contains("'%m'"));
    assert_eq!(params.len(), 1);

    // nothing
    let mut sql = String::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    handlers::purchases::push_period_filter(&PeriodFilter::default(), "x", &mut sql, &mut params);
    assert!(sql.is_empty());
    assert!(params.is_empty());
}

// ----------------------------------------------------------------------- sales

#[tokio::test]
async fn daily_sales_counts_closed_orders_only() {
    let state = test_state();
    let day = open_day(&state).await;

    let first = place(&state, "ORD0001", "dine_in", 500.0).await;
    let second = place(&state, "ORD0002", "takeaway", 300.0).await;
    let third = place(&state, "ORD0003", "delivery", 900.0).await;
    set_status(&state, first.id, "closed").await.unwrap();
    set_status(&state, second.id, "closed").await.unwrap();
    set_status(&state, third.id, "cancelled").await.unwrap();

    let sales = handlers::sales::daily(
        State(state.clone()),
        Query(DailySalesQuery {
            date: day.business_date.clone(),
        }),
    )
    .await
    .expect("daily")
    .0;

    assert_eq!(sales.date, day.business_date);
    assert_eq!(sales.total_sale, 800);
    assert_eq!(sales.order_count, 2);
}

#[tokio::test]
async fn daily_sales_for_unknown_date_is_zero() {
    let state = test_state();

    let sales = handlers::sales::daily(
        State(state.clone()),
        Query(DailySalesQuery {
            date: "1999-01-01".to_string(),
        }),
    )
    .await
    .expect("daily")
    .0;

    assert_eq!(sales.date, "1999-01-01");
    assert_eq!(sales.total_sale, 0);
    assert_eq!(sales.order_count, 0);
}

#[tokio::test]
async fn sales_history_lists_days_newest_first() {
    let state = test_state();
    let day = open_day(&state).await;
    let order = place(&state, "ORD0001", "dine_in", 450.0).await;
    set_status(&state, order.id, "closed").await.unwrap();

    // seed an older, already closed day
    {
        let conn = state.db.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO business_days (business_date, opened_at, closed_at, is_open)
             VALUES ('2020-05-01', '2020-05-01 10:00:00', '2020-05-01 23:00:00', 0)",
            [],
        )
        .unwrap();
    }

    let history = handlers::sales::history(State(state.clone()), Query(PeriodFilter::default()))
        .await
        .expect("history")
        .0;

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, day.business_date);
    assert_eq!(history[0].total_sale, 450);
    assert_eq!(history[1].date, "2020-05-01");
    assert_eq!(history[1].total_sale, 0);

    // a year filter narrows the result
    let filtered = handlers::sales::history(
        State(state.clone()),
        Query(PeriodFilter {
            year: Some(2020),
            ..Default::default()
        }),
    )
    .await
    .expect("history")
    .0;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].date, "2020-05-01");
}

// ----------------------------------------------------------------------- stats

#[tokio::test]
async fn monthly_sales_counts_closed_orders_only() {
    let state = test_state();
    open_day(&state).await;

    let first = place(&state, "ORD0001", "dine_in", 100.0).await;
    let second = place(&state, "ORD0002", "takeaway", 250.0).await;
    place(&state, "ORD0003", "delivery", 999.0).await; // stays created
    set_status(&state, first.id, "closed").await.unwrap();
    set_status(&state, second.id, "closed").await.unwrap();

    let total = handlers::stats::monthly_sales(State(state.clone()))
        .await
        .expect("monthly sales")
        .0;
    assert_eq!(total.total, 350);
}

#[tokio::test]
async fn monthly_orders_bucket_by_type() {
    let state = test_state();
    open_day(&state).await;

    for (order_id, order_type) in [
        ("ORD0001", "dine_in"),
        ("ORD0002", "dine_in"),
        ("ORD0003", "takeaway"),
        ("ORD0004", "delivery"),
    ] {
        let order = place(&state, order_id, order_type, 100.0).await;
        set_status(&state, order.id, "closed").await.unwrap();
    }
    // cancelled orders stay out of every bucket
    let extra = place(&state, "ORD0005", "delivery", 100.0).await;
    set_status(&state, extra.id, "cancelled").await.unwrap();

    let counts = handlers::stats::monthly_orders(State(state.clone()))
        .await
        .expect("monthly orders")
        .0;
    assert_eq!(counts.dine_in, 2);
    assert_eq!(counts.takeaway, 1);
    assert_eq!(counts.delivery, 1);
}

#[tokio::test]
async fn weekly_sales_always_has_seven_days() {
    let state = test_state();
    open_day(&state).await;
    let order = place(&state, "ORD0001", "dine_in", 600.0).await;
    set_status(&state, order.id, "closed").await.unwrap();

    let week = handlers::stats::weekly_sales(State(state.clone()))
        .await
        .expect("weekly")
        .0;

    assert_eq!(week.days.len(), 7);
    assert_eq!(week.days[0].date, week.week_start);
    let summed: f64 = week.days.iter().map(|d| d.total).sum();
    assert_eq!(summed, week.week_total);
    assert_eq!(week.week_total, 600.0);
    assert_eq!(week.days.iter().filter(|d| d.has_sales).count(), 1);
}

#[tokio::test]
async fn daily_trend_is_zero_without_yesterday_sales() {
    let state = test_state();
    open_day(&state).await;
    let order = place(&state, "ORD0001", "dine_in", 400.0).await;
    set_status(&state, order.id, "closed").await.unwrap();

    let trend = handlers::stats::daily_sales(State(state.clone()))
        .await
        .expect("daily trend")
        .0;

    assert_eq!(trend.total_sale, 400.0);
    assert_eq!(trend.order_count, 1);
    assert_eq!(trend.previous_total_sale, 0.0);
    assert_eq!(trend.trend, 0.0);
}

#[tokio::test]
async fn daily_trend_compares_against_yesterday() {
    let state = test_state();
    open_day(&state).await;

    let today = place(&state, "ORD0001", "dine_in", 300.0).await;
    set_status(&state, today.id, "closed").await.unwrap();
    let yesterday = place(&state, "ORD0002", "dine_in", 200.0).await;
    set_status(&state, yesterday.id, "closed").await.unwrap();

    {
        let conn = state.db.conn.lock().unwrap();
        conn.execute(
            "UPDATE orders SET created_at = datetime('now', '-1 day') WHERE id = ?1",
            [yesterday.id],
        )
        .unwrap();
    }

    let trend = handlers::stats::daily_sales(State(state.clone()))
        .await
        .expect("daily trend")
        .0;

    assert_eq!(trend.total_sale, 300.0);
    assert_eq!(trend.previous_total_sale, 200.0);
    assert_eq!(trend.trend, 50.0);
}

// ------------------------------------------------------------------------ menu

#[tokio::test]
async fn menu_groups_items_under_categories() {
    let state = test_state();

    let (_, Json(category)) = handlers::menu::create_category(
        State(state.clone()),
        Json(CreateCategory {
            name: "Curries".to_string(),
        }),
    )
    .await
    .expect("create category");

    let (_, Json(item)) = handlers::menu::create_item(
        State(state.clone()),
        Json(CreateItem {
            category_id: category.id,
            name: "Chicken Karahi".to_string(),
            price: 1200.0,
            status: None,
            description: Some("Full handi".to_string()),
        }),
    )
    .await
    .expect("create item");
    assert_eq!(item.status, "available");

    let menu = handlers::menu::menu(State(state.clone()))
        .await
        .expect("menu")
        .0;
    assert_eq!(menu.len(), 1);
    assert_eq!(menu[0].name, "Curries");
    assert_eq!(menu[0].items.len(), 1);
    assert_eq!(menu[0].items[0].name, "Chicken Karahi");
}

#[tokio::test]
async fn deleting_a_category_removes_its_items() {
    let state = test_state();

    let (_, Json(category)) = handlers::menu::create_category(
        State(state.clone()),
        Json(CreateCategory {
            name: "Drinks".to_string(),
        }),
    )
    .await
    .unwrap();

    let (_, Json(item)) = handlers::menu::create_item(
        State(state.clone()),
        Json(CreateItem {
            category_id: category.id,
            name: "Lassi".to_string(),
            price: 150.0,
            status: Some("available".to_string()),
            description: None,
        }),
    )
    .await
    .unwrap();

    let status = handlers::menu::delete_category(State(state.clone()), Path(category.id))
        .await
        .expect("delete");
    assert_eq!(status, StatusCode::NO_CONTENT);

    let err = handlers::menu::get_item(State(state.clone()), Path(item.id))
        .await
        .err()
        .expect("item must be gone");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn item_status_is_validated() {
    let state = test_state();

    let (_, Json(category)) = handlers::menu::create_category(
        State(state.clone()),
        Json(CreateCategory {
            name: "Sides".to_string(),
        }),
    )
    .await
    .unwrap();

    let err = handlers::menu::create_item(
        State(state.clone()),
        Json(CreateItem {
            category_id: category.id,
            name: "Fries".to_string(),
            price: 200.0,
            status: Some("sold-out".to_string()),
            description: None,
        }),
    )
    .await
    .err()
    .expect("bad status must fail");
    assert!(matches!(err, AppError::Validation(_)));
}

// -------------------------------------------------------------------- printing

#[test]
fn ticket_builder_frames_the_stream() {
    let mut t = printer::TicketBuilder::new();
    t.justify(printer::Justify::Center)
        .emphasis(true)
        .line("HELLO")
        .emphasis(false)
        .feed(2)
        .cut();
    let bytes = t.into_bytes();

    assert!(bytes.starts_with(&[0x1B, b'@']));
    assert!(bytes.ends_with(&[0x1D, b'V', b'A', 3]));
    let text_start = bytes
        .windows(5)
        .position(|w| w == b"HELLO")
        .expect("text present");
    assert_eq!(bytes[text_start + 5], b'\n');
}

#[test]
fn receipt_carries_order_and_totals() {
    let config = test_config();
    let order = Order {
        id: 1,
        order_id: "ORD0007".to_string(),
        order_type: "dine_in".to_string(),
        items: sample_items(),
        total_bill: 1600.0,
        discount: 100.0,
        service_charges: 0.0,
        delivery_charges: 0.0,
        net_bill: 1500.0,
        status: "closed".to_string(),
        customer_phone: Some("0300-1234567".to_string()),
        table_no: Some("t4".to_string()),
        business_day_id: 1,
        created_at: "2026-08-25 12:00:00".to_string(),
    };

    let bytes = printer::render_receipt(&config, &order, 2000.0, 500.0);
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.contains("TEST SHOP"));
    assert!(text.contains("#ORD0007"));
    assert!(text.contains("TYPE       : DINE_IN"));
    assert!(text.contains("TABLE      : T4"));
    assert!(text.contains("PHONE      : 0300-1234567"));
    assert!(text.contains("Chicken Karahi(Full)"));
    assert!(text.contains("DISCOUNT"));
    assert!(text.contains("NET TOTAL   : RS.1500"));
    assert!(text.contains("CASH RECEIVED   : RS.2000"));
    assert!(text.contains("THANK YOU!"));
}

#[test]
fn kitchen_ticket_handles_missing_items() {
    let config = test_config();
    let bytes = printer::render_kitchen_ticket(&config, "0001", "takeaway", None, None, &[]);
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.contains("No items found"));
    assert!(!text.contains("NET TOTAL"));
}

#[tokio::test]
async fn kitchen_print_endpoint_is_tolerant_of_partial_payloads() {
    let mut state = test_state();
    let printer_file = tempfile::NamedTempFile::new().unwrap();
    state.config.printer = Some(printer_file.path().to_string_lossy().to_string());

    let payload = serde_json::json!({
        "order_id": "0009",
        "items": [{"item_name": "Naan", "qty": 2}]
    });
    let response = handlers::print::kitchen_ticket(State(state.clone()), Json(payload))
        .await
        .expect("print")
        .0;
    assert!(response.status);
    assert_eq!(response.message, "Printed successfully");

    let written = std::fs::read(printer_file.path()).unwrap();
    assert!(!written.is_empty());
}

#[tokio::test]
async fn kitchen_print_without_printer_is_a_dependency_failure() {
    let state = test_state();

    let err = handlers::print::kitchen_ticket(State(state.clone()), Json(serde_json::json!({})))
        .await
        .err()
        .expect("no printer");
    assert!(matches!(err, AppError::Dependency(_)));
}

// --------------------------------------------------------------------- storage

#[test]
fn bill_images_are_stored_under_a_fresh_key() {
    let dir = tempfile::tempdir().unwrap();
    let upload_dir = dir.path().to_string_lossy().to_string();

    let key = storage::store_bill_image(&upload_dir, "receipt.JPG", b"fake image").unwrap();
    assert!(key.starts_with("purchase-bills/"));
    assert!(key.ends_with(".JPG"));

    let stored = std::fs::read(dir.path().join(&key)).unwrap();
    assert_eq!(stored, b"fake image");

    // no extension falls back to .bin
    let key = storage::store_bill_image(&upload_dir, "receipt", b"x").unwrap();
    assert!(key.ends_with(".bin"));
}
