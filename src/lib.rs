mod api;
mod auth_events;
mod checkout;
mod commands;
mod config;
mod db;
mod models;
mod state;

#[cfg(test)]
mod tests;

use auth_events::{AuthStatePayload, AuthSubscription};
use commands::{auth, cart, menu, orders, settings};
use config::BackendConfig;
use db::Database;
use state::Stores;
use tauri::{Emitter, Manager};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Keeps the root view's auth subscription alive for the app's lifetime;
/// dropping it (app teardown) unsubscribes.
struct RootAuthSubscription(#[allow(dead_code)] AuthSubscription);

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    dotenvy::dotenv().ok();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .setup(|app| {
            // Local persistence for the whitelisted stores
            let db = Database::new(app.handle()).expect("Failed to create database");
            db.initialize().expect("Failed to initialize database");

            let stores = Stores::new();

            // Rehydrate the persisted whitelist. Settings and profile load
            // straight from disk; the session is only trusted after
            // restore_session validates it with the auth collaborator.
            if let Ok(Some(saved)) = db.load_settings() {
                if let Ok(mut settings) = stores.settings.lock() {
                    *settings = saved;
                }
            }
            if let Ok(Some(profile)) = db.load_profile() {
                if let Ok(mut session) = stores.session.lock() {
                    session.user = Some(profile);
                }
            }

            // Root auth subscription: every auth event reaches the webview
            // as long as the app lives.
            let handle = app.handle().clone();
            let subscription = stores.auth_events.subscribe(move |event, session| {
                let payload = AuthStatePayload {
                    event,
                    session: session.cloned(),
                };
                if let Err(e) = handle.emit("auth:state", payload) {
                    warn!("failed to emit auth:state: {e}");
                }
            });

            app.manage(db);
            app.manage(stores);
            app.manage(RootAuthSubscription(subscription));

            match BackendConfig::from_env() {
                Ok(backend_config) => {
                    app.manage(api::Backend::new(backend_config));
                }
                // Commands surface this when they actually need the backend
                Err(e) => warn!("{e}"),
            }

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Cart
            cart::get_cart,
            cart::add_to_cart,
            cart::remove_from_cart,
            cart::update_quantity,
            cart::clear_cart,
            // Menu
            menu::fetch_menu,
            menu::invalidate_menu,
            menu::create_menu_item,
            menu::update_menu_item,
            menu::set_menu_item_availability,
            menu::delete_menu_item,
            menu::upload_menu_image,
            // Orders
            orders::get_orders,
            orders::fetch_orders,
            orders::advance_order_status,
            orders::clear_current_order,
            // Session
            auth::current_session,
            auth::restore_session,
            auth::login,
            auth::signup,
            auth::logout,
            // Checkout
            commands::checkout::get_checkout_state,
            commands::checkout::begin_checkout,
            commands::checkout::complete_checkout,
            commands::checkout::cancel_checkout,
            // Settings
            settings::get_settings,
            settings::fetch_settings,
            settings::save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
