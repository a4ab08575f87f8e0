use crate::auth_events::AuthEventHub;
use crate::checkout::CheckoutState;
use crate::models::{
    CartItem, MenuItem, Order, OrderStatus, Session, Settings, UserProfile,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tauri::{AppHandle, Manager};

/// Selected items plus the derived total. The total is recomputed from the
/// items after every mutation, never set independently.
#[derive(Debug, Serialize, Clone, Default)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub total: f64,
}

impl CartState {
    /// Add an item; an existing entry with the same id absorbs the quantity
    /// instead of duplicating the line.
    pub fn add_item(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
        self.recompute_total();
    }

    /// Remove the matching entry. Silent no-op if the id is not in the cart.
    pub fn remove_item(&mut self, id: &str) {
        self.items.retain(|i| i.id != id);
        self.recompute_total();
    }

    /// Set an item's quantity directly. Zero or below removes the entry;
    /// the cart never keeps a zero-quantity line.
    pub fn set_quantity(&mut self, id: &str, quantity: i32) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.quantity = quantity;
        }
        self.recompute_total();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total = 0.0;
    }

    fn recompute_total(&mut self) {
        self.total = self
            .items
            .iter()
            .map(|i| i.price * i.quantity as f64)
            .sum();
    }
}

/// Read cache of the remote menu, invalidated explicitly.
#[derive(Debug, Serialize, Clone, Default)]
pub struct MenuState {
    pub items: Vec<MenuItem>,
    pub cache_valid: bool,
    pub last_fetched: i64,
}

impl MenuState {
    pub fn mark_fetched(&mut self, items: Vec<MenuItem>, fetched_at_ms: i64) {
        self.items = items;
        self.last_fetched = fetched_at_ms;
        self.cache_valid = true;
    }

    pub fn invalidate(&mut self) {
        self.cache_valid = false;
    }
}

/// Orders visible to the current user, newest first, plus the order the
/// active checkout produced.
#[derive(Debug, Serialize, Clone, Default)]
pub struct OrdersState {
    pub orders: Vec<Order>,
    pub current_order: Option<Order>,
    pub tracking_code: Option<String>,
}

impl OrdersState {
    pub fn set_orders(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    pub fn push_current(&mut self, order: Order) {
        self.current_order = Some(order.clone());
        self.orders.insert(0, order);
    }

    /// Apply a remotely-confirmed status; the local guess is never trusted.
    pub fn apply_status(&mut self, id: &str, status: OrderStatus) {
        for order in self.orders.iter_mut().filter(|o| o.id == id) {
            order.status = status;
        }
        if let Some(current) = self.current_order.as_mut() {
            if current.id == id {
                current.status = status;
            }
        }
    }

    pub fn clear_current(&mut self) {
        self.current_order = None;
        self.tracking_code = None;
    }
}

/// Mirror of the auth collaborator's session.
#[derive(Debug, Serialize, Clone, Default)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionState {
    pub fn apply_session(&mut self, session: &Session) {
        self.access_token = Some(session.access_token.clone());
        self.refresh_token = Some(session.refresh_token.clone());
        self.user = Some(UserProfile {
            email: session.user.email.clone(),
            name: None,
        });
    }

    pub fn clear(&mut self) {
        self.access_token = None;
        self.refresh_token = None;
        self.user = None;
    }

    pub fn as_session(&self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token.clone()?,
            refresh_token: self.refresh_token.clone()?,
            user: crate::models::AuthUser {
                email: self.user.as_ref()?.email.clone(),
            },
        })
    }
}

/// All client stores behind one managed handle. Mutations go through the
/// reducer methods above; commands emit a change event after each one so
/// the view layer re-renders.
pub struct Stores {
    pub cart: Mutex<CartState>,
    pub menu: Mutex<MenuState>,
    pub orders: Mutex<OrdersState>,
    pub session: Mutex<SessionState>,
    pub settings: Mutex<Settings>,
    pub checkout: Mutex<CheckoutState>,
    pub auth_events: Arc<AuthEventHub>,
}

impl Stores {
    pub fn new() -> Self {
        Stores {
            cart: Mutex::new(CartState::default()),
            menu: Mutex::new(MenuState::default()),
            orders: Mutex::new(OrdersState::default()),
            session: Mutex::new(SessionState::default()),
            settings: Mutex::new(Settings::default()),
            checkout: Mutex::new(CheckoutState::Idle),
            auth_events: AuthEventHub::new(),
        }
    }
}

impl Default for Stores {
    fn default() -> Self {
        Stores::new()
    }
}

pub trait StoresExt {
    fn stores(&self) -> &Stores;
}

impl StoresExt for AppHandle {
    fn stores(&self) -> &Stores {
        self.state::<Stores>().inner()
    }
}
