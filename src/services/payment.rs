// src/services/payment.rs

//! Payment gateway boundary. The orchestrator only sees the `PaymentGateway`
//! trait; `RestPaymentGateway` drives the provider's checkout-session REST
//! API, and `MockPaymentGateway` stands in for it in tests and demos.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};

/// Everything the provider needs to open a hosted checkout session. Amounts
/// are integer minor units; the provider does not accept decimals.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
  pub order_id: Uuid,
  pub amount_minor: i64,
  pub currency: String,
  pub success_url: String,
  pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
  /// Provider session id, stored on the order as the correlation token.
  pub id: String,
  /// Hosted payment page the human is redirected to.
  pub url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession>;
}

// --- Production implementation (provider REST API, no SDK dependency) ---

pub struct RestPaymentGateway {
  secret_key: String,
  api_base: String,
  client: reqwest::Client,
}

impl RestPaymentGateway {
  pub fn new(secret_key: String, api_base: String) -> Self {
    Self {
      secret_key,
      api_base,
      client: reqwest::Client::new(),
    }
  }
}

#[async_trait]
impl PaymentGateway for RestPaymentGateway {
  #[instrument(skip(self, request), fields(order_id = %request.order_id, amount_minor = request.amount_minor))]
  async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession> {
    let order_id = request.order_id.to_string();
    let amount = request.amount_minor.to_string();
    let currency = request.currency.to_lowercase();
    let product_name = format!("Order {}", request.order_id);

    let resp: serde_json::Value = self
      .client
      .post(format!("{}/v1/checkout/sessions", self.api_base))
      .basic_auth(&self.secret_key, None::<&str>)
      .form(&[
        ("mode", "payment"),
        ("line_items[0][price_data][currency]", currency.as_str()),
        ("line_items[0][price_data][product_data][name]", product_name.as_str()),
        ("line_items[0][price_data][unit_amount]", amount.as_str()),
        ("line_items[0][quantity]", "1"),
        ("success_url", request.success_url.as_str()),
        ("cancel_url", request.cancel_url.as_str()),
        // Correlation token: matched against the webhook's session object.
        ("metadata[order_id]", order_id.as_str()),
      ])
      .send()
      .await
      .map_err(|e| AppError::ExternalService(format!("checkout session request failed: {}", e)))?
      .json()
      .await
      .map_err(|e| AppError::ExternalService(format!("checkout session response unreadable: {}", e)))?;

    match (resp["id"].as_str(), resp["url"].as_str()) {
      (Some(id), Some(url)) => Ok(CheckoutSession {
        id: id.to_string(),
        url: url.to_string(),
      }),
      _ => Err(AppError::ExternalService(format!("checkout session rejected: {}", resp))),
    }
  }
}

// --- Mock implementation for tests and demo runs ---

#[derive(Default)]
pub struct MockPaymentGateway {
  fail_next: AtomicBool,
  requests: Mutex<Vec<CheckoutSessionRequest>>,
}

impl MockPaymentGateway {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make the next session creation fail with an `ExternalService` error.
  pub fn fail_next(&self) {
    self.fail_next.store(true, Ordering::SeqCst);
  }

  /// Requests observed so far, in order.
  pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
    self.requests.lock().expect("mock gateway lock").clone()
  }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
  #[instrument(skip(self, request), fields(order_id = %request.order_id))]
  async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession> {
    tokio::time::sleep(std::time::Duration::from_millis(10)).await; // Simulate network latency
    if self.fail_next.swap(false, Ordering::SeqCst) {
      return Err(AppError::ExternalService("mock gateway configured to fail".to_string()));
    }
    self.requests.lock().expect("mock gateway lock").push(request.clone());

    let session_id = format!("mock_cs_{}", Uuid::new_v4().simple());
    info!("Mock gateway created checkout session {}", session_id);
    Ok(CheckoutSession {
      url: format!("https://pay.example.test/session/{}", session_id),
      id: session_id,
    })
  }
}
