use crate::state::{CartState, SessionState};
use serde::Serialize;
use thiserror::Error;

/// Where the checkout sequence currently stands. The sequence is linear:
/// Idle -> Validating -> CreatingOrder -> InitializingPayment ->
/// AwaitingRedirect -> VerifyingPayment -> Completed, with Failed reachable
/// from every step.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum CheckoutState {
    Idle,
    Validating,
    CreatingOrder,
    InitializingPayment {
        order_id: String,
    },
    AwaitingRedirect {
        order_id: String,
        reference: String,
        authorization_url: String,
    },
    VerifyingPayment {
        order_id: String,
        reference: String,
    },
    Completed {
        order_id: String,
        reference: String,
    },
    Failed {
        reason: CheckoutFailure,
    },
}

/// Typed failure exits of the checkout sequence. Every failure is terminal
/// for the current attempt; a fresh user-initiated checkout starts over.
#[derive(Debug, Serialize, Clone, PartialEq, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CheckoutFailure {
    #[error("Cart is empty. Please add items to your cart before checkout.")]
    EmptyCart,
    #[error("Login required. Please login before making a payment.")]
    LoginRequired,
    #[error("Checkout failed: {0}")]
    OrderCreation(String),
    #[error("Payment init failed: {0}")]
    PaymentInit(String),
    #[error("Payment cancelled. You cancelled the payment.")]
    Cancelled,
    #[error("Missing payment reference")]
    MissingReference,
    #[error("Payment not successful: {0}")]
    Verification(String),
}

/// Returned to the caller once the hosted checkout page has been opened.
#[derive(Debug, Serialize, Clone)]
pub struct CheckoutPending {
    pub order_id: String,
    pub reference: String,
    pub authorization_url: String,
}

/// Returned once the gateway confirmed the payment.
#[derive(Debug, Serialize, Clone)]
pub struct CheckoutReceipt {
    pub order_id: String,
    pub reference: String,
}

/// Guards run before any network call: the cart must hold something worth
/// paying for and a session token must exist.
pub fn validate(cart: &CartState, session: &SessionState) -> Result<(), CheckoutFailure> {
    if cart.items.is_empty() || cart.total <= 0.0 {
        return Err(CheckoutFailure::EmptyCart);
    }
    if session.access_token.is_none() {
        return Err(CheckoutFailure::LoginRequired);
    }
    Ok(())
}

/// Convert a decimal ZAR total to the gateway's integer minor units
/// (cents), rounded to the nearest cent, never below 1.
pub fn to_minor_units(total: f64) -> i64 {
    ((total * 100.0).round() as i64).max(1)
}

/// Pull the payment reference out of the callback URL. The gateway sends
/// `reference`, older callbacks use the `trxref` alias, and if neither is
/// present the reference handed out at init time is used.
pub fn extract_reference(callback_url: &str, init_reference: &str) -> String {
    query_param(callback_url, "reference")
        .or_else(|| query_param(callback_url, "trxref"))
        .unwrap_or_else(|| init_reference.to_string())
}

pub fn extract_order_id(callback_url: &str) -> Option<String> {
    query_param(callback_url, "order_id")
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}
