use super::{access_token, backend, emit_store};
use crate::db::DatabaseExt;
use crate::models::Settings;
use crate::state::StoresExt;
use tauri::AppHandle;

fn apply_and_persist(app: &AppHandle, settings: &Settings) -> Result<(), String> {
    {
        let mut state = app.stores().settings.lock().map_err(|e| e.to_string())?;
        *state = settings.clone();
    }
    app.db().save_settings(settings)?;
    emit_store(app, "settings:changed", settings.clone());
    Ok(())
}

#[tauri::command]
pub fn get_settings(app: AppHandle) -> Result<Settings, String> {
    let settings = app.stores().settings.lock().map_err(|e| e.to_string())?;
    Ok(settings.clone())
}

/// Load the restaurant settings from the backend. A backend with no
/// settings row yet just leaves the current (possibly persisted) values.
#[tauri::command]
pub async fn fetch_settings(app: AppHandle) -> Result<Settings, String> {
    let token = access_token(&app)?;
    let row = {
        let backend = backend(&app)?;
        backend
            .fetch_settings(token.as_deref())
            .await
            .map_err(|e| e.to_string())?
    };
    match row {
        Some(row) => {
            let settings = row.into_settings();
            apply_and_persist(&app, &settings)?;
            Ok(settings)
        }
        None => get_settings(app),
    }
}

/// Save settings through the singleton upsert and mirror what the backend
/// stored.
#[tauri::command]
pub async fn save_settings(app: AppHandle, settings: Settings) -> Result<Settings, String> {
    let token = access_token(&app)?;
    let row = {
        let backend = backend(&app)?;
        backend
            .upsert_settings(token.as_deref(), &settings)
            .await
            .map_err(|e| e.to_string())?
    };
    let stored = row.into_settings();
    apply_and_persist(&app, &stored)?;
    Ok(stored)
}
