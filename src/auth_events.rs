use crate::models::Session;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Auth lifecycle events mirrored from the authentication collaborator.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Payload forwarded to the webview on every auth event.
#[derive(Debug, Serialize, Clone)]
pub struct AuthStatePayload {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

type Listener = Box<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

/// In-process auth event stream. Session operations publish here; the root
/// view subscribes once for its lifetime and forwards events to the webview.
pub struct AuthEventHub {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl AuthEventHub {
    pub fn new() -> Arc<Self> {
        Arc::new(AuthEventHub {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Register a listener. The subscription unregisters itself when
    /// dropped, so a listener can never outlive its owner.
    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> AuthSubscription
    where
        F: Fn(AuthEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Box::new(listener)));
        }
        AuthSubscription {
            id,
            hub: Arc::downgrade(self),
        }
    }

    pub fn emit(&self, event: AuthEvent, session: Option<&Session>) {
        let Ok(listeners) = self.listeners.lock() else {
            return;
        };
        for (_, listener) in listeners.iter() {
            listener(event, session);
        }
    }

    fn unsubscribe(&self, id: u64) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(listener_id, _)| *listener_id != id);
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// Handle for one registered listener; dropping it unsubscribes.
pub struct AuthSubscription {
    id: u64,
    hub: Weak<AuthEventHub>,
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(self.id);
        }
    }
}
