use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::Config;
use crate::error::ApiError;

/// Thin client for the external payment gateway's order API.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

impl GatewayClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.gateway_url.trim_end_matches('/').to_owned(),
            key_id: config.gateway_key_id.clone(),
            key_secret: config.gateway_key_secret.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Registers an order on the gateway side. Amount arrives in major
    /// units and is converted to the gateway's minor unit.
    pub async fn create_order(&self, amount: f32) -> Result<GatewayOrder, ApiError> {
        let amount_minor = to_minor_units(amount);
        let receipt = receipt_label();

        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_minor,
                "currency": self.currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|err| ApiError::Internal(format!("Gateway unreachable: {err}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Internal(format!(
                "Gateway rejected order creation: {}",
                response.status()
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|err| ApiError::Internal(format!("Malformed gateway response: {err}")))
    }
}

pub fn to_minor_units(amount: f32) -> i64 {
    (amount as f64 * 100.0).round() as i64
}

fn receipt_label() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("rcpt_{suffix}")
}
