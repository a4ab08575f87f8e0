use super::{access_token, backend, emit_store};
use crate::models::{Order, OrderStatus};
use crate::state::{OrdersState, StoresExt};
use tauri::AppHandle;

fn snapshot(app: &AppHandle) -> Result<OrdersState, String> {
    let orders = app.stores().orders.lock().map_err(|e| e.to_string())?;
    Ok(orders.clone())
}

#[tauri::command]
pub fn get_orders(app: AppHandle) -> Result<OrdersState, String> {
    snapshot(&app)
}

/// Fetch all orders visible to the caller, newest first. Admin filtering is
/// a client-side predicate over this collection; no round-trip per filter.
#[tauri::command]
pub async fn fetch_orders(app: AppHandle) -> Result<Vec<Order>, String> {
    let token = access_token(&app)?;
    let rows = {
        let backend = backend(&app)?;
        backend
            .fetch_orders(token.as_deref())
            .await
            .map_err(|e| e.to_string())?
    };
    let orders: Vec<Order> = rows.into_iter().map(|row| row.into_order()).collect();

    {
        let mut state = app.stores().orders.lock().map_err(|e| e.to_string())?;
        state.set_orders(orders.clone());
    }
    emit_store(&app, "orders:changed", snapshot(&app)?);
    Ok(orders)
}

/// Advance an order one step through the status cycle. The locally computed
/// next status is only a request; the status the backend confirms is what
/// lands in the store.
#[tauri::command]
pub async fn advance_order_status(app: AppHandle, id: String) -> Result<Order, String> {
    let current: OrderStatus = {
        let state = app.stores().orders.lock().map_err(|e| e.to_string())?;
        state
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.status)
            .ok_or_else(|| "Order not found".to_string())?
    };

    let token = access_token(&app)?;
    let confirmed = {
        let backend = backend(&app)?;
        backend
            .update_order_status(token.as_deref(), &id, current.next())
            .await
            .map_err(|e| e.to_string())?
    };

    let updated = {
        let mut state = app.stores().orders.lock().map_err(|e| e.to_string())?;
        state.apply_status(&confirmed.id, confirmed.status);
        state
            .orders
            .iter()
            .find(|o| o.id == confirmed.id)
            .cloned()
            .ok_or_else(|| "Order not found".to_string())?
    };
    emit_store(&app, "orders:changed", snapshot(&app)?);
    Ok(updated)
}

#[tauri::command]
pub fn clear_current_order(app: AppHandle) -> Result<(), String> {
    {
        let mut state = app.stores().orders.lock().map_err(|e| e.to_string())?;
        state.clear_current();
    }
    emit_store(&app, "orders:changed", snapshot(&app)?);
    Ok(())
}
