use super::{backend, emit_store};
use crate::checkout::{
    extract_order_id, extract_reference, to_minor_units, validate, CheckoutFailure,
    CheckoutPending, CheckoutReceipt, CheckoutState,
};
use crate::models::{CreateOrder, OrderItem, OrderType};
use crate::state::StoresExt;
use tauri::AppHandle;
use tauri_plugin_opener::OpenerExt;
use tracing::info;

fn set_state(app: &AppHandle, state: CheckoutState) {
    if let Ok(mut checkout) = app.stores().checkout.lock() {
        *checkout = state.clone();
    }
    emit_store(app, "checkout:state", state);
}

/// Record the failure, notify the view, and hand back the user-facing
/// message for the command error.
fn fail(app: &AppHandle, failure: CheckoutFailure) -> String {
    let message = failure.to_string();
    set_state(app, CheckoutState::Failed { reason: failure });
    message
}

#[tauri::command]
pub fn get_checkout_state(app: AppHandle) -> Result<CheckoutState, String> {
    let checkout = app.stores().checkout.lock().map_err(|e| e.to_string())?;
    Ok(checkout.clone())
}

/// Run the checkout sequence up to the hosted payment page: validate the
/// cart and session, create the pending order, initialize the payment, and
/// open the authorization URL externally. The flow then suspends until the
/// gateway redirects back through the deep-link callback (or the user
/// cancels).
#[tauri::command]
pub async fn begin_checkout(
    app: AppHandle,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    notes: Option<String>,
) -> Result<CheckoutPending, String> {
    set_state(&app, CheckoutState::Validating);

    let (items, total, email) = {
        let stores = app.stores();
        let cart = stores.cart.lock().map_err(|e| e.to_string())?;
        let session = stores.session.lock().map_err(|e| e.to_string())?;
        validate(&cart, &session).map_err(|failure| fail(&app, failure))?;
        let email = session.user.as_ref().map(|u| u.email.clone());
        (cart.items.clone(), cart.total, email)
    };
    let token = super::access_token(&app)?;

    set_state(&app, CheckoutState::CreatingOrder);
    let order_payload = CreateOrder {
        customer_name: customer_name
            .filter(|n| !n.is_empty())
            .or_else(|| email.clone())
            .unwrap_or_else(|| "Guest".to_string()),
        customer_phone: customer_phone.filter(|p| !p.is_empty()),
        notes: notes.filter(|n| !n.is_empty()),
        items: items
            .iter()
            .map(|it| OrderItem {
                id: it.id.clone(),
                name: it.name.clone(),
                qty: it.quantity,
                price: it.price,
            })
            .collect(),
        total,
        order_type: OrderType::Takeout,
    };

    let row = {
        let backend = backend(&app)
            .map_err(|e| fail(&app, CheckoutFailure::OrderCreation(e)))?;
        backend
            .insert_order(token.as_deref(), &order_payload)
            .await
            .map_err(|e| fail(&app, CheckoutFailure::OrderCreation(e.to_string())))?
    };
    let order_id = row.id.clone();

    // Keep the line snapshot on the local order; the insert stays minimal.
    let mut order = row.into_order();
    order.items = Some(order_payload.items.clone());
    order.total = Some(total);
    {
        let mut orders = app.stores().orders.lock().map_err(|e| e.to_string())?;
        orders.push_current(order);
    }

    set_state(
        &app,
        CheckoutState::InitializingPayment {
            order_id: order_id.clone(),
        },
    );
    // The gateway wants the lowest currency unit; totals are ZAR.
    let amount = to_minor_units(total);
    let email = email.unwrap_or_else(|| "customer@example.com".to_string());

    let payment = {
        let backend = backend(&app)
            .map_err(|e| fail(&app, CheckoutFailure::PaymentInit(e)))?;
        let callback_url = backend.config().payment_callback_url(&order_id);
        backend
            .init_payment(
                token.as_deref(),
                amount,
                &email,
                &order_id,
                &callback_url,
            )
            .await
            .map_err(|e| fail(&app, CheckoutFailure::PaymentInit(e.to_string())))?
    };

    set_state(
        &app,
        CheckoutState::AwaitingRedirect {
            order_id: order_id.clone(),
            reference: payment.reference.clone(),
            authorization_url: payment.authorization_url.clone(),
        },
    );
    info!("opening hosted checkout for order {order_id}");
    app.opener()
        .open_url(payment.authorization_url.clone(), None::<&str>)
        .map_err(|e| {
            fail(
                &app,
                CheckoutFailure::PaymentInit(format!("Could not open payment page: {e}")),
            )
        })?;

    Ok(CheckoutPending {
        order_id,
        reference: payment.reference,
        authorization_url: payment.authorization_url,
    })
}

/// Resume the suspended sequence when the deep-link callback comes back
/// from the gateway: extract the reference, verify server-side, and only
/// then clear the cart and mark the flow complete. The callback URL is the
/// primary source; the in-memory redirect state fills the gaps so the flow
/// also survives the app being relaunched by the deep link itself.
#[tauri::command]
pub async fn complete_checkout(
    app: AppHandle,
    callback_url: String,
) -> Result<CheckoutReceipt, String> {
    let pending = {
        let checkout = app.stores().checkout.lock().map_err(|e| e.to_string())?;
        match &*checkout {
            CheckoutState::AwaitingRedirect {
                order_id,
                reference,
                ..
            } => Some((order_id.clone(), reference.clone())),
            _ => None,
        }
    };

    let init_reference = pending
        .as_ref()
        .map(|(_, reference)| reference.clone())
        .unwrap_or_default();
    let reference = extract_reference(&callback_url, &init_reference);
    let order_id = extract_order_id(&callback_url)
        .or_else(|| pending.map(|(order_id, _)| order_id));

    let Some(order_id) = order_id else {
        return Err(fail(&app, CheckoutFailure::MissingReference));
    };
    if reference.is_empty() {
        return Err(fail(&app, CheckoutFailure::MissingReference));
    }

    set_state(
        &app,
        CheckoutState::VerifyingPayment {
            order_id: order_id.clone(),
            reference: reference.clone(),
        },
    );

    let token = super::access_token(&app)?;
    if token.is_none() {
        return Err(fail(&app, CheckoutFailure::LoginRequired));
    }

    let verification = {
        let backend = backend(&app)
            .map_err(|e| fail(&app, CheckoutFailure::Verification(e)))?;
        backend
            .verify_payment(token.as_deref(), &reference, &order_id)
            .await
            .map_err(|e| fail(&app, CheckoutFailure::Verification(e.to_string())))?
    };
    if !verification.paid {
        let status = verification.status.unwrap_or_else(|| "unknown".to_string());
        return Err(fail(&app, CheckoutFailure::Verification(status)));
    }

    // Payment confirmed: the cart's job is done.
    let cleared = {
        let mut cart = app.stores().cart.lock().map_err(|e| e.to_string())?;
        cart.clear();
        cart.clone()
    };
    emit_store(&app, "cart:changed", cleared);
    {
        let mut orders = app.stores().orders.lock().map_err(|e| e.to_string())?;
        orders.tracking_code = Some(reference.clone());
    }

    set_state(
        &app,
        CheckoutState::Completed {
            order_id: order_id.clone(),
            reference: reference.clone(),
        },
    );
    info!("payment verified for order {order_id}");
    Ok(CheckoutReceipt {
        order_id,
        reference,
    })
}

/// The hosted session came back without a successful redirect, or the user
/// backed out. A distinct non-error halt: the cart stays intact.
#[tauri::command]
pub fn cancel_checkout(app: AppHandle) -> Result<(), String> {
    let pending = {
        let checkout = app.stores().checkout.lock().map_err(|e| e.to_string())?;
        matches!(&*checkout, CheckoutState::AwaitingRedirect { .. })
    };
    if pending {
        fail(&app, CheckoutFailure::Cancelled);
    } else {
        set_state(&app, CheckoutState::Idle);
    }
    Ok(())
}
