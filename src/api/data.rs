use super::{single_row, ApiError, Backend};
use crate::models::{
    CreateMenuItem, CreateOrder, MenuItem, OrderRow, OrderStatus, Settings, SettingsRow,
    UpdateMenuItem,
};
use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct OrderStatusRow {
    pub id: String,
    pub status: OrderStatus,
}

impl Backend {
    // ----- menu_items -----

    pub async fn fetch_menu_items(&self, token: Option<&str>) -> Result<Vec<MenuItem>, ApiError> {
        let url = format!("{}?select=*&order=name.asc", self.rest_url("menu_items"));
        self.send_json(self.request(Method::GET, url, token)).await
    }

    pub async fn insert_menu_item(
        &self,
        token: Option<&str>,
        item: &CreateMenuItem,
    ) -> Result<MenuItem, ApiError> {
        let url = format!("{}?select=*", self.rest_url("menu_items"));
        let body = json!({
            "name": item.name,
            "description": item.description,
            "price": item.price,
            "category": item.category,
            "available": item.available,
            "image_url": item.image_url.clone().unwrap_or_default(),
        });
        let rows: Vec<MenuItem> = self
            .send_json(
                self.request(Method::POST, url, token)
                    .header("Prefer", "return=representation")
                    .json(&body),
            )
            .await?;
        single_row(rows)
    }

    pub async fn update_menu_item(
        &self,
        token: Option<&str>,
        item: &UpdateMenuItem,
    ) -> Result<MenuItem, ApiError> {
        let url = format!(
            "{}?id=eq.{}&select=*",
            self.rest_url("menu_items"),
            item.id
        );
        let body = json!({
            "name": item.name,
            "description": item.description,
            "price": item.price,
            "category": item.category,
            "available": item.available,
            "image_url": item.image_url.clone().unwrap_or_default(),
        });
        let rows: Vec<MenuItem> = self
            .send_json(
                self.request(Method::PATCH, url, token)
                    .header("Prefer", "return=representation")
                    .json(&body),
            )
            .await?;
        single_row(rows)
    }

    pub async fn set_menu_item_availability(
        &self,
        token: Option<&str>,
        id: &str,
        available: bool,
    ) -> Result<MenuItem, ApiError> {
        let url = format!("{}?id=eq.{}&select=*", self.rest_url("menu_items"), id);
        let rows: Vec<MenuItem> = self
            .send_json(
                self.request(Method::PATCH, url, token)
                    .header("Prefer", "return=representation")
                    .json(&json!({ "available": available })),
            )
            .await?;
        single_row(rows)
    }

    pub async fn delete_menu_item(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        let url = format!("{}?id=eq.{}", self.rest_url("menu_items"), id);
        self.send_ok(self.request(Method::DELETE, url, token)).await
    }

    // ----- orders -----

    pub async fn fetch_orders(&self, token: Option<&str>) -> Result<Vec<OrderRow>, ApiError> {
        let url = format!(
            "{}?select=id,customer_name,total,status,type,created_at&order=created_at.desc",
            self.rest_url("orders")
        );
        self.send_json(self.request(Method::GET, url, token)).await
    }

    pub async fn insert_order(
        &self,
        token: Option<&str>,
        order: &CreateOrder,
    ) -> Result<OrderRow, ApiError> {
        let url = format!(
            "{}?select=id,customer_name,total,status,type,created_at",
            self.rest_url("orders")
        );
        // Keep the insert minimal; the item snapshot stays client-side.
        let body = json!({
            "customer_name": order.customer_name,
            "total": order.total,
            "status": "pending",
            "type": order.order_type,
        });
        let rows: Vec<OrderRow> = self
            .send_json(
                self.request(Method::POST, url, token)
                    .header("Prefer", "return=representation")
                    .json(&body),
            )
            .await?;
        single_row(rows)
    }

    pub async fn update_order_status(
        &self,
        token: Option<&str>,
        id: &str,
        status: OrderStatus,
    ) -> Result<OrderStatusRow, ApiError> {
        let url = format!("{}?id=eq.{}&select=id,status", self.rest_url("orders"), id);
        let rows: Vec<OrderStatusRow> = self
            .send_json(
                self.request(Method::PATCH, url, token)
                    .header("Prefer", "return=representation")
                    .json(&json!({ "status": status })),
            )
            .await?;
        single_row(rows)
    }

    // ----- settings -----

    pub async fn fetch_settings(
        &self,
        token: Option<&str>,
    ) -> Result<Option<SettingsRow>, ApiError> {
        let url = format!(
            "{}?select=id,restaurant_name,phone,email,address,weekday_hours,weekend_hours&limit=1",
            self.rest_url("settings")
        );
        let mut rows: Vec<SettingsRow> =
            self.send_json(self.request(Method::GET, url, token)).await?;
        if rows.is_empty() {
            // No settings saved yet; not an error.
            return Ok(None);
        }
        Ok(Some(rows.remove(0)))
    }

    /// Upsert the singleton settings row (fixed id) and return what the
    /// backend stored.
    pub async fn upsert_settings(
        &self,
        token: Option<&str>,
        settings: &Settings,
    ) -> Result<SettingsRow, ApiError> {
        let url = format!(
            "{}?select=id,restaurant_name,phone,email,address,weekday_hours,weekend_hours&on_conflict=id",
            self.rest_url("settings")
        );
        let body = json!({
            "id": "singleton",
            "restaurant_name": settings.restaurant_name,
            "phone": settings.phone,
            "email": settings.email,
            "address": settings.address,
            "weekday_hours": settings.weekday_hours,
            "weekend_hours": settings.weekend_hours,
            "updated_at": Utc::now().to_rfc3339(),
        });
        let rows: Vec<SettingsRow> = self
            .send_json(
                self.request(Method::POST, url, token)
                    .header("Prefer", "resolution=merge-duplicates,return=representation")
                    .json(&body),
            )
            .await?;
        single_row(rows)
    }
}
