use super::backend;
use crate::auth_events::AuthEvent;
use crate::db::DatabaseExt;
use crate::models::{Session, UserProfile};
use crate::state::{SessionState, StoresExt};
use tauri::AppHandle;
use tracing::{info, warn};

fn apply_and_persist(app: &AppHandle, session: &Session) -> Result<(), String> {
    {
        let mut state = app.stores().session.lock().map_err(|e| e.to_string())?;
        state.apply_session(session);
    }
    app.db().save_session(session)?;
    app.db().save_profile(&UserProfile {
        email: session.user.email.clone(),
        name: None,
    })?;
    Ok(())
}

fn clear_local(app: &AppHandle) -> Result<(), String> {
    {
        let mut state = app.stores().session.lock().map_err(|e| e.to_string())?;
        state.clear();
    }
    app.db().clear_session()
}

fn session_snapshot(app: &AppHandle) -> Result<SessionState, String> {
    let state = app.stores().session.lock().map_err(|e| e.to_string())?;
    Ok(state.clone())
}

#[tauri::command]
pub fn current_session(app: AppHandle) -> Result<SessionState, String> {
    session_snapshot(&app)
}

/// Restore a previously issued session on launch. The persisted tokens are
/// only trusted after the auth collaborator exchanges the refresh token for
/// a fresh pair; a stale session is cleared, not an error.
#[tauri::command]
pub async fn restore_session(app: AppHandle) -> Result<Option<Session>, String> {
    let Some(stored) = app.db().load_session()? else {
        app.stores()
            .auth_events
            .emit(AuthEvent::InitialSession, None);
        return Ok(None);
    };

    let refreshed = {
        let backend = backend(&app)?;
        backend.refresh_session(&stored.refresh_token).await
    };

    match refreshed {
        Ok(session) => {
            apply_and_persist(&app, &session)?;
            app.stores()
                .auth_events
                .emit(AuthEvent::InitialSession, Some(&session));
            info!("session restored for {}", session.user.email);
            Ok(Some(session))
        }
        Err(e) => {
            warn!("stored session rejected: {e}");
            clear_local(&app)?;
            app.stores().auth_events.emit(AuthEvent::SignedOut, None);
            Ok(None)
        }
    }
}

#[tauri::command]
pub async fn login(app: AppHandle, email: String, password: String) -> Result<Session, String> {
    let session = {
        let backend = backend(&app)?;
        backend
            .login(&email, &password)
            .await
            .map_err(|e| e.to_string())?
    };
    apply_and_persist(&app, &session)?;
    app.stores()
        .auth_events
        .emit(AuthEvent::SignedIn, Some(&session));
    Ok(session)
}

#[tauri::command]
pub async fn signup(app: AppHandle, email: String, password: String) -> Result<Session, String> {
    let session = {
        let backend = backend(&app)?;
        backend
            .signup(&email, &password)
            .await
            .map_err(|e| e.to_string())?
    };
    apply_and_persist(&app, &session)?;
    app.stores()
        .auth_events
        .emit(AuthEvent::SignedIn, Some(&session));
    Ok(session)
}

/// Clear the local session. The collaborator's own sign-out invalidates the
/// remote session; this only drops the client's mirror of it.
#[tauri::command]
pub fn logout(app: AppHandle) -> Result<(), String> {
    clear_local(&app)?;
    app.stores().auth_events.emit(AuthEvent::SignedOut, None);
    Ok(())
}
