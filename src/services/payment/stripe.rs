//! Stripe PaymentIntent creation over the REST API.
//!
//! - 金額は最小通貨単位 (cent) で送る
//! - automatic_payment_methods を有効にし、client_secret だけを呼び出し側に返す

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("price must be at least one cent")]
    InvalidAmount,
    #[error("payment processor is not configured")]
    NotConfigured,
    #[error("payment processor transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment processor returned {status}")]
    Upstream { status: u16 },
}

/// Convert a client-supplied price (number or numeric string, in dollars) into cents.
pub fn price_to_cents(price: &Value) -> Result<i64, PaymentError> {
    let dollars = match price {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|d| d.is_finite())
    .ok_or(PaymentError::InvalidAmount)?;

    let cents = (dollars * 100.0).round() as i64;
    if cents < 1 {
        return Err(PaymentError::InvalidAmount);
    }
    Ok(cents)
}

/// Something that can open a payment intent and hand back its client secret.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    client_secret: String,
}

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: Url,
    secret_key: Option<String>,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the secret key
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base.as_str())
            .field("configured", &self.secret_key.is_some())
            .finish()
    }
}

impl StripeClient {
    pub fn new(api_base: Url, secret_key: Option<String>) -> Result<Self, PaymentError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            http,
            api_base,
            secret_key,
        })
    }

    fn intents_url(&self) -> String {
        format!(
            "{}/v1/payment_intents",
            self.api_base.as_str().trim_end_matches('/')
        )
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, PaymentError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or(PaymentError::NotConfigured)?;

        let amount = amount_cents.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let resp = self
            .http
            .post(self.intents_url())
            .bearer_auth(secret_key)
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "payment intent creation rejected");
            return Err(PaymentError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: PaymentIntentResponse = resp.json().await?;
        Ok(body.client_secret)
    }
}
