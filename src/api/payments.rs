use super::{ApiError, Backend};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

/// Hosted checkout session handed out by the payment-init function.
#[derive(Debug, Clone)]
pub struct PaymentSession {
    pub authorization_url: String,
    pub reference: String,
}

#[derive(Debug, Deserialize)]
struct InitResponse {
    authorization_url: Option<String>,
    reference: Option<String>,
}

/// Outcome reported by the payment-verify function. Anything but
/// `paid == true` means the payment did not go through.
#[derive(Debug, Deserialize)]
pub struct PaymentVerification {
    #[serde(default)]
    pub paid: bool,
    pub status: Option<String>,
}

impl Backend {
    /// Start a hosted payment. `amount` is in integer minor units (cents).
    pub async fn init_payment(
        &self,
        token: Option<&str>,
        amount: i64,
        email: &str,
        order_id: &str,
        callback_url: &str,
    ) -> Result<PaymentSession, ApiError> {
        let url = self.function_url("paystack-init");
        let body = json!({
            "amount": amount,
            "email": email,
            "order_id": order_id,
            "callback_url": callback_url,
        });
        let init: InitResponse = self
            .send_json(self.request(Method::POST, url, token).json(&body))
            .await?;
        match (init.authorization_url, init.reference) {
            (Some(authorization_url), Some(reference)) => Ok(PaymentSession {
                authorization_url,
                reference,
            }),
            _ => Err(ApiError::Remote("Missing authorization URL".to_string())),
        }
    }

    /// Ask the backend to verify a payment with the gateway. The client
    /// never decides payment success on its own.
    pub async fn verify_payment(
        &self,
        token: Option<&str>,
        reference: &str,
        order_id: &str,
    ) -> Result<PaymentVerification, ApiError> {
        let url = self.function_url("paystack-verify");
        let body = json!({ "reference": reference, "order_id": order_id });
        self.send_json(self.request(Method::POST, url, token).json(&body))
            .await
    }
}
