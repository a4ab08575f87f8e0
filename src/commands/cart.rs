use super::emit_store;
use crate::models::CartItem;
use crate::state::{CartState, StoresExt};
use tauri::AppHandle;

fn snapshot(app: &AppHandle) -> Result<CartState, String> {
    let cart = app.stores().cart.lock().map_err(|e| e.to_string())?;
    Ok(cart.clone())
}

#[tauri::command]
pub fn get_cart(app: AppHandle) -> Result<CartState, String> {
    snapshot(&app)
}

#[tauri::command]
pub fn add_to_cart(app: AppHandle, item: CartItem) -> Result<CartState, String> {
    {
        let mut cart = app.stores().cart.lock().map_err(|e| e.to_string())?;
        cart.add_item(item);
    }
    let cart = snapshot(&app)?;
    emit_store(&app, "cart:changed", cart.clone());
    Ok(cart)
}

#[tauri::command]
pub fn remove_from_cart(app: AppHandle, id: String) -> Result<CartState, String> {
    {
        let mut cart = app.stores().cart.lock().map_err(|e| e.to_string())?;
        cart.remove_item(&id);
    }
    let cart = snapshot(&app)?;
    emit_store(&app, "cart:changed", cart.clone());
    Ok(cart)
}

/// Set an item's quantity. Zero or below removes the item; the decrement
/// control in the cart view relies on this.
#[tauri::command]
pub fn update_quantity(app: AppHandle, id: String, quantity: i32) -> Result<CartState, String> {
    {
        let mut cart = app.stores().cart.lock().map_err(|e| e.to_string())?;
        cart.set_quantity(&id, quantity);
    }
    let cart = snapshot(&app)?;
    emit_store(&app, "cart:changed", cart.clone());
    Ok(cart)
}

#[tauri::command]
pub fn clear_cart(app: AppHandle) -> Result<CartState, String> {
    {
        let mut cart = app.stores().cart.lock().map_err(|e| e.to_string())?;
        cart.clear();
    }
    let cart = snapshot(&app)?;
    emit_store(&app, "cart:changed", cart.clone());
    Ok(cart)
}
