use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guest,
    Client,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Client => "client",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(name: &str) -> Option<Role> {
        match name {
            "guest" => Some(Role::Guest),
            "client" => Some(Role::Client),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Option<Role>,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_manager(&self) -> bool {
        self.role == Some(Role::Manager)
    }

    pub fn can_filter(&self) -> bool {
        matches!(self.role, Some(Role::Manager) | Some(Role::Admin))
    }

    pub fn can_view_orders(&self) -> bool {
        matches!(self.role, Some(Role::Manager) | Some(Role::Admin))
    }

    pub fn can_edit_products(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn can_edit_orders(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    pub id: i64,
    pub article: String,
    pub name: String,
    pub unit: String,
    pub price: f64,
    pub discount: f64,
    pub stock: i64,
    pub description: String,
    pub image: Option<String>,
    pub category_id: i64,
    pub category_name: Option<String>,
    pub manufacturer_id: i64,
    pub manufacturer_name: Option<String>,
    pub supplier_id: i64,
    pub supplier_name: Option<String>,
}

impl Product {
    /// Sale price after discount; the plain price when no discount applies.
    pub fn final_price(&self) -> f64 {
        if self.discount > 0.0 {
            self.price * (1.0 - self.discount / 100.0)
        } else {
            self.price
        }
    }

    pub fn has_discount(&self) -> bool {
        self.discount > 0.0
    }

    /// Listing row style: out-of-stock wins over on-sale.
    pub fn row_class(&self) -> &'static str {
        if self.stock == 0 {
            return "table-info";
        }
        if self.discount > 15.0 {
            return "row-sale";
        }
        ""
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProduct {
    pub article: String,
    pub name: String,
    pub unit: String,
    pub price: f64,
    pub discount: f64,
    pub stock: i64,
    pub description: String,
    pub category_id: i64,
    pub manufacturer_id: i64,
    pub supplier_id: i64,
}

/// Edit-form payload; the article is the business key and stays immutable.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub price: f64,
    pub discount: f64,
    pub stock: i64,
    pub description: String,
    pub category_id: i64,
    pub manufacturer_id: i64,
    pub supplier_id: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    New,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(name: &str) -> Option<OrderStatus> {
        match name {
            "new" => Some(OrderStatus::New),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    pub id: i64,
    pub number: i64,
    pub article: String,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub client_name: String,
    pub pickup_code: String,
    pub status: OrderStatus,
    pub delivery_point_id: Option<i64>,
    pub delivery_point_address: Option<String>,
    pub client_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrder {
    pub number: i64,
    pub article: String,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub client_name: String,
    pub pickup_code: String,
    pub status: OrderStatus,
    pub delivery_point_id: Option<i64>,
    pub client_id: Option<i64>,
}

/// Edit-form payload; the order number stays immutable.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateOrder {
    pub id: i64,
    pub article: String,
    pub order_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub client_name: String,
    pub pickup_code: String,
    pub status: OrderStatus,
    pub delivery_point_id: Option<i64>,
    pub client_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeliveryPoint {
    pub id: i64,
    pub address: String,
}

/// Listing query parameters the presentation layer hands to the store.
#[derive(Debug, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub supplier_id: Option<i64>,
    pub sort: ProductSort,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Name,
    StockAsc,
    StockDesc,
}

#[derive(Debug, Default)]
pub struct OrderQuery {
    pub search: Option<String>,
}
