use std::env;

pub const MISSING_ENV: &str = "Missing SUPABASE_URL / SUPABASE_ANON_KEY";

/// Connection settings for the managed backend, read from the environment.
/// `dotenvy` loads a local `.env` in development; production builds get the
/// variables from the packaging environment.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
    pub deep_link_scheme: String,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("SUPABASE_URL").map_err(|_| MISSING_ENV.to_string())?;
        let anon_key = env::var("SUPABASE_ANON_KEY").map_err(|_| MISSING_ENV.to_string())?;
        let deep_link_scheme =
            env::var("DEEP_LINK_SCHEME").unwrap_or_else(|_| "delice".to_string());
        Ok(BackendConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            deep_link_scheme,
        })
    }

    /// Callback URL the payment gateway redirects to after the hosted
    /// checkout page. The order id rides along so verification can match
    /// the payment back to the pending order.
    pub fn payment_callback_url(&self, order_id: &str) -> String {
        format!(
            "{}://paystack/callback?order_id={}",
            self.deep_link_scheme, order_id
        )
    }
}
