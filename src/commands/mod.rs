pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;
pub mod settings;

use crate::api::Backend;
use crate::config::MISSING_ENV;
use crate::state::StoresExt;
use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager, State};

/// Backend handle, or the configuration error if the environment was
/// missing at startup.
pub(crate) fn backend(app: &AppHandle) -> Result<State<'_, Backend>, String> {
    app.try_state::<Backend>()
        .ok_or_else(|| MISSING_ENV.to_string())
}

/// Current access token, if a session is active.
pub(crate) fn access_token(app: &AppHandle) -> Result<Option<String>, String> {
    let session = app
        .stores()
        .session
        .lock()
        .map_err(|e| e.to_string())?;
    Ok(session.access_token.clone())
}

/// Notify the view layer that a store changed.
pub(crate) fn emit_store<P: Serialize + Clone>(app: &AppHandle, event: &str, payload: P) {
    if let Err(e) = app.emit(event, payload) {
        tracing::warn!("failed to emit {event}: {e}");
    }
}
