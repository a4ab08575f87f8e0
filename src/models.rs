use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub available: bool,
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMenuItem {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub available: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateMenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub available: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub image_url: String,
    pub category: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Next status in the admin advance cycle. Wraps from cancelled back to
    /// pending; the backend stays authoritative and may reject the request.
    pub fn next(self) -> OrderStatus {
        match self {
            OrderStatus::Pending => OrderStatus::Confirmed,
            OrderStatus::Confirmed => OrderStatus::Ready,
            OrderStatus::Ready => OrderStatus::Completed,
            OrderStatus::Completed => OrderStatus::Cancelled,
            OrderStatus::Cancelled => OrderStatus::Pending,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Confirmed => write!(f, "confirmed"),
            OrderStatus::Ready => write!(f, "ready"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Takeout,
    Reservation,
}

/// Snapshot of one ordered line, carried on the order after checkout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    pub qty: i32,
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub tracking_code: Option<String>,
    pub items: Option<Vec<OrderItem>>,
    pub total: Option<f64>,
    pub guest_count: Option<i32>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: OrderStatus,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

/// Order row as the orders table returns it.
#[derive(Debug, Deserialize)]
pub struct OrderRow {
    pub id: String,
    #[allow(dead_code)]
    pub customer_name: Option<String>,
    pub total: Option<f64>,
    pub status: OrderStatus,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub created_at: Option<String>,
}

impl OrderRow {
    pub fn into_order(self) -> Order {
        let (date, time) = split_created_at(self.created_at.as_deref());
        Order {
            id: self.id,
            tracking_code: None,
            items: None,
            total: self.total,
            guest_count: None,
            date,
            time,
            status: self.status,
            order_type: self.order_type,
        }
    }
}

/// Split an RFC 3339 created_at into (YYYY-MM-DD, HH:MM) for display.
pub fn split_created_at(created_at: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = created_at else {
        return (None, None);
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => (
            Some(dt.format("%Y-%m-%d").to_string()),
            Some(dt.format("%H:%M").to_string()),
        ),
        // Keep at least the date part when the timestamp is not RFC 3339
        Err(_) if raw.len() >= 10 && raw.is_char_boundary(10) => {
            (Some(raw[..10].to_string()), None)
        }
        Err(_) => (None, None),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateOrder {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OrderItem>,
    pub total: f64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthUser {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Settings {
    pub restaurant_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub weekday_hours: String,
    pub weekend_hours: String,
}

/// Settings row as the settings table returns it (singleton id).
#[derive(Debug, Deserialize)]
pub struct SettingsRow {
    #[allow(dead_code)]
    pub id: String,
    pub restaurant_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub weekday_hours: Option<String>,
    pub weekend_hours: Option<String>,
}

impl SettingsRow {
    pub fn into_settings(self) -> Settings {
        Settings {
            restaurant_name: self.restaurant_name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            weekday_hours: self.weekday_hours.unwrap_or_default(),
            weekend_hours: self.weekend_hours.unwrap_or_default(),
        }
    }
}
