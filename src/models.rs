use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BusinessDay {
    pub id: i64,
    pub business_date: String,
    pub opened_at: String,
    pub closed_at: Option<String>,
    pub is_open: bool,
}

/// Order lifecycle. Stored as text; transitions form a strict one-way graph.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Closed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Closed => "closed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(OrderStatus::Created),
            "closed" => Some(OrderStatus::Closed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Allowed next statuses. A closed order can still be voided.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match self {
            OrderStatus::Created => {
                matches!(next, OrderStatus::Closed | OrderStatus::Cancelled)
            }
            OrderStatus::Closed => matches!(next, OrderStatus::Cancelled),
            OrderStatus::Cancelled => false,
        }
    }
}

/// One line on an order ticket. `type` carries the variant (e.g. "Large").
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderLine {
    pub item_name: String,
    #[serde(rename = "type", default)]
    pub item_type: String,
    pub qty: i64,
    pub line_total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: i64,
    pub order_id: String,
    pub order_type: String,
    pub items: Vec<OrderLine>,
    pub total_bill: f64,
    pub discount: f64,
    pub service_charges: f64,
    pub delivery_charges: f64,
    pub net_bill: f64,
    pub status: String,
    pub customer_phone: Option<String>,
    pub table_no: Option<String>,
    pub business_day_id: i64,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrder {
    pub order_id: String,
    pub order_type: String,
    pub items: Vec<OrderLine>,
    pub total_bill: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub service_charges: f64,
    #[serde(default)]
    pub delivery_charges: f64,
    #[serde(default)]
    pub net_bill: f64,
    pub customer_phone: Option<String>,
    pub table_no: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeBill {
    pub discount: Option<f64>,
    pub service_charges: Option<f64>,
    pub delivery_charges: Option<f64>,
    pub net_bill: f64,
    pub cash: f64,
    pub change: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub order_type: Option<String>,
    pub item: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PurchaseItem {
    pub title: String,
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Purchase {
    pub id: i64,
    pub purchase_category_id: i64,
    pub category_name: Option<String>,
    pub items: Vec<PurchaseItem>,
    pub total_bill: f64,
    pub bill_image: Option<String>,
    pub business_day_id: i64,
    pub created_at: String,
}

/// Date filters shared by purchases and sales history.
/// Precedence: date range, then month+year, then year, then none.
#[derive(Debug, Deserialize, Default)]
pub struct PeriodFilter {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PurchaseCategory {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseCategory {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategory {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Item {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub price: f64,
    pub status: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub category_id: i64,
    pub name: String,
    pub price: f64,
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct DaySales {
    pub date: String,
    pub total_sale: i64,
    pub order_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct DailySalesQuery {
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct WeekDaySales {
    pub date: String,
    pub total: f64,
    pub has_sales: bool,
}

#[derive(Debug, Serialize)]
pub struct WeeklySales {
    pub week_start: String,
    pub days: Vec<WeekDaySales>,
    pub week_total: f64,
}

#[derive(Debug, Serialize)]
pub struct DailySalesTrend {
    pub date: String,
    pub total_sale: f64,
    pub order_count: i64,
    pub previous_date: String,
    pub previous_total_sale: f64,
    pub previous_order_count: i64,
    pub trend: f64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyTotal {
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyOrderCounts {
    pub delivery: i64,
    pub dine_in: i64,
    pub takeaway: i64,
}
