//! Tests for the client stores, the checkout sequence, and local
//! persistence. Everything here runs against local state and pure
//! functions; the remote collaborators are exercised only through their
//! parsing and mapping code.

#[cfg(test)]
mod tests {
    use crate::api::storage::{extension_for, object_path};
    use crate::api::error_message;
    use crate::auth_events::{AuthEvent, AuthEventHub};
    use crate::checkout::{
        extract_order_id, extract_reference, to_minor_units, validate, CheckoutFailure,
    };
    use crate::db::Database;
    use crate::models::{
        split_created_at, AuthUser, CartItem, OrderRow, OrderStatus, OrderType, Session,
        Settings, UserProfile,
    };
    use crate::state::{CartState, MenuState, OrdersState, SessionState};
    use std::sync::{Arc, Mutex};

    fn cart_item(id: &str, price: f64, quantity: i32) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Item {id}"),
            price,
            quantity,
            image_url: String::new(),
            category: "meals".to_string(),
        }
    }

    fn session(email: &str) -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user: AuthUser {
                email: email.to_string(),
            },
        }
    }

    // ===== CART TESTS =====

    #[test]
    fn test_cart_total_tracks_every_operation() {
        let mut cart = CartState::default();

        cart.add_item(cart_item("meal-1", 129.99, 1));
        assert!((cart.total - 129.99).abs() < 0.001);

        cart.add_item(cart_item("drink-1", 38.0, 2));
        assert!((cart.total - 205.99).abs() < 0.001);

        cart.set_quantity("drink-1", 1);
        assert!((cart.total - 167.99).abs() < 0.001);

        cart.remove_item("meal-1");
        assert!((cart.total - 38.0).abs() < 0.001);

        cart.clear();
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_add_same_id_merges_quantity() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("a", 10.0, 1));
        cart.add_item(cart_item("a", 10.0, 1));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert!((cart.total - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_remove_missing_item_is_noop() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("a", 10.0, 1));
        cart.remove_item("does-not-exist");

        assert_eq!(cart.items.len(), 1);
        assert!((cart.total - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_set_quantity_zero_removes_item() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("a", 10.0, 3));

        cart.set_quantity("a", 0);
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_set_quantity_negative_removes_item() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("a", 10.0, 3));

        cart.set_quantity("a", -2);
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_clear_resets_regardless_of_prior_state() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("a", 10.0, 3));
        cart.add_item(cart_item("b", 5.5, 2));

        cart.clear();
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_cart_preserves_insertion_order() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("b", 5.0, 1));
        cart.add_item(cart_item("a", 10.0, 1));
        cart.add_item(cart_item("b", 5.0, 1));

        let ids: Vec<&str> = cart.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    // ===== CHECKOUT GUARD TESTS =====

    #[test]
    fn test_checkout_rejects_empty_cart() {
        let cart = CartState::default();
        let mut session_state = SessionState::default();
        session_state.apply_session(&session("user@example.com"));

        assert_eq!(
            validate(&cart, &session_state),
            Err(CheckoutFailure::EmptyCart)
        );
    }

    #[test]
    fn test_checkout_rejects_zero_total() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("freebie", 0.0, 1));
        let mut session_state = SessionState::default();
        session_state.apply_session(&session("user@example.com"));

        assert_eq!(
            validate(&cart, &session_state),
            Err(CheckoutFailure::EmptyCart)
        );
    }

    #[test]
    fn test_checkout_requires_session_token() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("a", 10.0, 1));

        assert_eq!(
            validate(&cart, &SessionState::default()),
            Err(CheckoutFailure::LoginRequired)
        );
    }

    #[test]
    fn test_checkout_guards_pass_with_items_and_session() {
        let mut cart = CartState::default();
        cart.add_item(cart_item("a", 10.0, 1));
        let mut session_state = SessionState::default();
        session_state.apply_session(&session("user@example.com"));

        assert_eq!(validate(&cart, &session_state), Ok(()));
    }

    #[test]
    fn test_failure_messages() {
        assert!(CheckoutFailure::EmptyCart.to_string().contains("Cart is empty"));
        assert!(CheckoutFailure::LoginRequired
            .to_string()
            .contains("Login required"));
        assert_eq!(
            CheckoutFailure::Cancelled.to_string(),
            "Payment cancelled. You cancelled the payment."
        );
        assert_eq!(
            CheckoutFailure::Verification("abandoned".to_string()).to_string(),
            "Payment not successful: abandoned"
        );
    }

    // ===== MINOR UNIT CONVERSION TESTS =====

    #[test]
    fn test_total_converts_to_cents() {
        assert_eq!(to_minor_units(205.99), 20599);
        assert_eq!(to_minor_units(129.99), 12999);
        assert_eq!(to_minor_units(38.0), 3800);
    }

    #[test]
    fn test_minor_units_round_to_nearest_cent() {
        assert_eq!(to_minor_units(10.004), 1000);
        assert_eq!(to_minor_units(10.006), 1001);
    }

    #[test]
    fn test_minor_units_never_below_one() {
        assert_eq!(to_minor_units(0.001), 1);
        assert_eq!(to_minor_units(0.0), 1);
    }

    // ===== CALLBACK URL TESTS =====

    #[test]
    fn test_reference_param_wins() {
        let url = "delice://paystack/callback?reference=abc&order_id=123";
        assert_eq!(extract_reference(url, "fallback"), "abc");
    }

    #[test]
    fn test_trxref_alias_used_without_reference() {
        let url = "delice://paystack/callback?trxref=xyz&order_id=123";
        assert_eq!(extract_reference(url, "fallback"), "xyz");
    }

    #[test]
    fn test_init_reference_used_as_last_resort() {
        let url = "delice://paystack/callback?order_id=123";
        assert_eq!(extract_reference(url, "init-ref"), "init-ref");
    }

    #[test]
    fn test_empty_reference_param_is_skipped() {
        let url = "delice://paystack/callback?reference=&trxref=xyz";
        assert_eq!(extract_reference(url, "fallback"), "xyz");
    }

    #[test]
    fn test_unparseable_callback_falls_back() {
        assert_eq!(extract_reference("not a url", "init-ref"), "init-ref");
    }

    #[test]
    fn test_order_id_extraction() {
        let url = "delice://paystack/callback?reference=abc&order_id=123";
        assert_eq!(extract_order_id(url), Some("123".to_string()));
        assert_eq!(extract_order_id("delice://paystack/callback"), None);
    }

    // ===== ORDER STATUS TESTS =====

    #[test]
    fn test_status_cycle() {
        assert_eq!(OrderStatus::Pending.next(), OrderStatus::Confirmed);
        assert_eq!(OrderStatus::Confirmed.next(), OrderStatus::Ready);
        assert_eq!(OrderStatus::Ready.next(), OrderStatus::Completed);
        assert_eq!(OrderStatus::Completed.next(), OrderStatus::Cancelled);
        // Repeated taps wrap a cancelled order back to pending
        assert_eq!(OrderStatus::Cancelled.next(), OrderStatus::Pending);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Ready).unwrap(),
            "\"ready\""
        );
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"cancelled\"").unwrap(),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn test_order_row_maps_to_order() {
        let row: OrderRow = serde_json::from_str(
            r#"{
                "id": "ord-1",
                "customer_name": "Guest",
                "total": 205.99,
                "status": "pending",
                "type": "takeout",
                "created_at": "2024-03-02T18:45:00+00:00"
            }"#,
        )
        .unwrap();

        let order = row.into_order();
        assert_eq!(order.id, "ord-1");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.order_type, OrderType::Takeout);
        assert_eq!(order.date.as_deref(), Some("2024-03-02"));
        assert_eq!(order.time.as_deref(), Some("18:45"));
        assert_eq!(order.total, Some(205.99));
        assert!(order.items.is_none());
    }

    #[test]
    fn test_created_at_split_handles_odd_input() {
        assert_eq!(split_created_at(None), (None, None));
        let (date, time) = split_created_at(Some("2024-03-02 18:45:00"));
        assert_eq!(date.as_deref(), Some("2024-03-02"));
        assert_eq!(time, None);
    }

    #[test]
    fn test_orders_state_applies_confirmed_status() {
        let mut state = OrdersState::default();
        let row: OrderRow = serde_json::from_str(
            r#"{"id": "ord-1", "customer_name": null, "total": 10.0,
                "status": "ready", "type": "takeout", "created_at": null}"#,
        )
        .unwrap();
        state.push_current(row.into_order());

        // The backend answered with something other than the local guess
        state.apply_status("ord-1", OrderStatus::Cancelled);
        assert_eq!(state.orders[0].status, OrderStatus::Cancelled);
        assert_eq!(
            state.current_order.as_ref().unwrap().status,
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn test_push_current_prepends() {
        let mut state = OrdersState::default();
        for id in ["ord-1", "ord-2"] {
            let row: OrderRow = serde_json::from_str(&format!(
                r#"{{"id": "{id}", "customer_name": null, "total": 1.0,
                    "status": "pending", "type": "takeout", "created_at": null}}"#
            ))
            .unwrap();
            state.push_current(row.into_order());
        }

        assert_eq!(state.orders[0].id, "ord-2");
        assert_eq!(state.current_order.as_ref().unwrap().id, "ord-2");

        state.clear_current();
        assert!(state.current_order.is_none());
        assert!(state.tracking_code.is_none());
        assert_eq!(state.orders.len(), 2);
    }

    // ===== MENU CACHE TESTS =====

    #[test]
    fn test_menu_cache_validity() {
        let mut menu = MenuState::default();
        assert!(!menu.cache_valid);

        menu.mark_fetched(Vec::new(), 1_700_000_000_000);
        assert!(menu.cache_valid);
        assert_eq!(menu.last_fetched, 1_700_000_000_000);

        menu.invalidate();
        assert!(!menu.cache_valid);
        // Invalidation only flips the flag; items stay until the next fetch
        assert_eq!(menu.last_fetched, 1_700_000_000_000);
    }

    // ===== SESSION TESTS =====

    #[test]
    fn test_sign_out_clears_everything() {
        let mut state = SessionState::default();
        state.apply_session(&session("user@example.com"));
        assert!(state.access_token.is_some());

        state.clear();
        assert_eq!(state.access_token, None);
        assert_eq!(state.refresh_token, None);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_session_roundtrip_through_state() {
        let mut state = SessionState::default();
        let original = session("user@example.com");
        state.apply_session(&original);

        assert_eq!(state.as_session(), Some(original));
        state.clear();
        assert_eq!(state.as_session(), None);
    }

    // ===== AUTH EVENT TESTS =====

    #[test]
    fn test_subscribers_receive_events() {
        let hub = AuthEventHub::new();
        let seen: Arc<Mutex<Vec<(AuthEvent, Option<String>)>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _subscription = hub.subscribe(move |event, session| {
            sink.lock()
                .unwrap()
                .push((event, session.map(|s| s.user.email.clone())));
        });

        hub.emit(AuthEvent::SignedIn, Some(&session("user@example.com")));
        hub.emit(AuthEvent::SignedOut, None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            (AuthEvent::SignedIn, Some("user@example.com".to_string()))
        );
        assert_eq!(seen[1], (AuthEvent::SignedOut, None));
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let hub = AuthEventHub::new();
        let subscription = hub.subscribe(|_, _| {});
        assert_eq!(hub.listener_count(), 1);

        drop(subscription);
        assert_eq!(hub.listener_count(), 0);

        // Emitting with no listeners is fine
        hub.emit(AuthEvent::TokenRefreshed, None);
    }

    // ===== ERROR MESSAGE TESTS =====

    #[test]
    fn test_error_body_json_fields() {
        let status = reqwest::StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(status, r#"{"error": "amount too small"}"#),
            "amount too small"
        );
        assert_eq!(
            error_message(status, r#"{"message": "row not found"}"#),
            "row not found"
        );
    }

    #[test]
    fn test_error_body_non_json_degrades_to_text() {
        let status = reqwest::StatusCode::BAD_GATEWAY;
        assert_eq!(error_message(status, "upstream timed out"), "upstream timed out");
    }

    #[test]
    fn test_error_body_empty_falls_back_to_status() {
        let status = reqwest::StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(error_message(status, ""), "HTTP 500");
        assert_eq!(error_message(status, "   "), "HTTP 500");
    }

    // ===== STORAGE PATH TESTS =====

    #[test]
    fn test_extension_from_mime_subtype() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/JPEG"), "jpeg");
        assert_eq!(extension_for("image/svg+xml"), "svgxml");
    }

    #[test]
    fn test_extension_defaults_to_jpeg() {
        assert_eq!(extension_for(""), "jpeg");
        assert_eq!(extension_for("image"), "jpeg");
        assert_eq!(extension_for("image/++"), "jpeg");
    }

    #[test]
    fn test_object_path_shape() {
        let path = object_path("image/png", 1_700_000_000_000, 0xdeadbeef);
        assert_eq!(path, "1700000000000-deadbeef.png");
    }

    // ===== LOCAL PERSISTENCE TESTS =====

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db = Database::open_at(&dir.path().join("delice.db")).expect("Failed to open database");
        db.initialize().expect("Failed to initialize database");
        (dir, db)
    }

    #[test]
    fn test_session_persists_across_open() {
        let (_dir, db) = test_db();
        assert_eq!(db.load_session().unwrap(), None);

        db.save_session(&session("user@example.com")).unwrap();
        let loaded = db.load_session().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.user.email, "user@example.com");
    }

    #[test]
    fn test_save_session_overwrites_singleton() {
        let (_dir, db) = test_db();
        db.save_session(&session("first@example.com")).unwrap();
        db.save_session(&session("second@example.com")).unwrap();

        let loaded = db.load_session().unwrap().unwrap();
        assert_eq!(loaded.user.email, "second@example.com");
    }

    #[test]
    fn test_clear_session_removes_profile_too() {
        let (_dir, db) = test_db();
        db.save_session(&session("user@example.com")).unwrap();
        db.save_profile(&UserProfile {
            email: "user@example.com".to_string(),
            name: Some("User".to_string()),
        })
        .unwrap();

        db.clear_session().unwrap();
        assert_eq!(db.load_session().unwrap(), None);
        assert_eq!(db.load_profile().unwrap(), None);
    }

    #[test]
    fn test_settings_roundtrip() {
        let (_dir, db) = test_db();
        assert_eq!(db.load_settings().unwrap(), None);

        let settings = Settings {
            restaurant_name: "Delice".to_string(),
            phone: "021 555 0100".to_string(),
            email: "hello@delice.example".to_string(),
            address: "1 Kloof St".to_string(),
            weekday_hours: "09:00-22:00".to_string(),
            weekend_hours: "10:00-23:00".to_string(),
        };
        db.save_settings(&settings).unwrap();
        assert_eq!(db.load_settings().unwrap(), Some(settings));
    }
}
