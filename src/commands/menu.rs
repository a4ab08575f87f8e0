use super::{access_token, backend, emit_store};
use crate::api::storage::{object_path, MENU_IMAGES_BUCKET};
use crate::models::{CreateMenuItem, MenuItem, UpdateMenuItem};
use crate::state::StoresExt;
use chrono::Utc;
use tauri::AppHandle;

/// Fetch the menu. A valid cache is served as-is unless `force` is set;
/// admin mutations invalidate it.
#[tauri::command]
pub async fn fetch_menu(app: AppHandle, force: Option<bool>) -> Result<Vec<MenuItem>, String> {
    let force = force.unwrap_or(false);
    {
        let menu = app.stores().menu.lock().map_err(|e| e.to_string())?;
        if menu.cache_valid && !force {
            return Ok(menu.items.clone());
        }
    }

    let token = access_token(&app)?;
    let items = {
        let backend = backend(&app)?;
        backend
            .fetch_menu_items(token.as_deref())
            .await
            .map_err(|e| e.to_string())?
    };

    {
        let mut menu = app.stores().menu.lock().map_err(|e| e.to_string())?;
        menu.mark_fetched(items.clone(), Utc::now().timestamp_millis());
    }
    emit_store(&app, "menu:changed", items.clone());
    Ok(items)
}

#[tauri::command]
pub fn invalidate_menu(app: AppHandle) -> Result<(), String> {
    invalidate_cache(&app)
}

fn invalidate_cache(app: &AppHandle) -> Result<(), String> {
    let mut menu = app.stores().menu.lock().map_err(|e| e.to_string())?;
    menu.invalidate();
    Ok(())
}

#[tauri::command]
pub async fn create_menu_item(app: AppHandle, item: CreateMenuItem) -> Result<MenuItem, String> {
    let token = access_token(&app)?;
    let created = {
        let backend = backend(&app)?;
        backend
            .insert_menu_item(token.as_deref(), &item)
            .await
            .map_err(|e| e.to_string())?
    };
    invalidate_cache(&app)?;
    Ok(created)
}

#[tauri::command]
pub async fn update_menu_item(app: AppHandle, item: UpdateMenuItem) -> Result<MenuItem, String> {
    let token = access_token(&app)?;
    let updated = {
        let backend = backend(&app)?;
        backend
            .update_menu_item(token.as_deref(), &item)
            .await
            .map_err(|e| e.to_string())?
    };
    invalidate_cache(&app)?;
    Ok(updated)
}

#[tauri::command]
pub async fn set_menu_item_availability(
    app: AppHandle,
    id: String,
    available: bool,
) -> Result<MenuItem, String> {
    let token = access_token(&app)?;
    let updated = {
        let backend = backend(&app)?;
        backend
            .set_menu_item_availability(token.as_deref(), &id, available)
            .await
            .map_err(|e| e.to_string())?
    };
    invalidate_cache(&app)?;
    Ok(updated)
}

#[tauri::command]
pub async fn delete_menu_item(app: AppHandle, id: String) -> Result<(), String> {
    let token = access_token(&app)?;
    {
        let backend = backend(&app)?;
        backend
            .delete_menu_item(token.as_deref(), &id)
            .await
            .map_err(|e| e.to_string())?;
    }
    invalidate_cache(&app)
}

/// Upload a menu item photo and return its public URL for the item record.
#[tauri::command]
pub async fn upload_menu_image(
    app: AppHandle,
    data: Vec<u8>,
    content_type: String,
) -> Result<String, String> {
    let token = access_token(&app)?;
    let path = object_path(
        &content_type,
        Utc::now().timestamp_millis(),
        rand::random::<u32>(),
    );
    let backend = backend(&app)?;
    backend
        .upload_object(
            token.as_deref(),
            MENU_IMAGES_BUCKET,
            &path,
            data,
            &content_type,
        )
        .await
        .map_err(|e| e.to_string())?;
    Ok(backend.public_url(MENU_IMAGES_BUCKET, &path))
}
