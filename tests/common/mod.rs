// tests/common/mod.rs
#![allow(dead_code)] // Allow unused helpers in this common test module

use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use bazaarhub::config::AppConfig;
use bazaarhub::models::{Product, ShippingAddress, User, UserRole};
use bazaarhub::services::payment::MockPaymentGateway;
use bazaarhub::services::signature;
use bazaarhub::state::AppState;
use bazaarhub::store::memory::MemoryStore;
use bazaarhub::store::{AccountStore, CatalogStore};

pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";

pub fn dec(s: &str) -> Decimal {
  Decimal::from_str(s).unwrap()
}

/// An application wired against the in-memory store and the mock gateway,
/// with direct handles on both for assertions.
pub struct TestApp {
  pub state: AppState,
  pub store: Arc<MemoryStore>,
  pub gateway: Arc<MockPaymentGateway>,
}

pub fn test_app() -> TestApp {
  test_app_with_rate("0.10")
}

pub fn test_app_with_rate(commission_rate: &str) -> TestApp {
  let config = AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "postgres://unused".to_string(),
    app_base_url: "http://localhost".to_string(),
    payment_secret_key: "sk_test_unused".to_string(),
    payment_webhook_secret: WEBHOOK_SECRET.to_string(),
    checkout_success_url: "http://localhost/checkout/success".to_string(),
    checkout_cancel_url: "http://localhost/checkout/cancel".to_string(),
    commission_rate: dec(commission_rate),
    currency: "PKR".to_string(),
    seed_db: false,
  };

  let store = Arc::new(MemoryStore::new());
  let gateway = Arc::new(MockPaymentGateway::new());
  let state = AppState {
    catalog: store.clone(),
    accounts: store.clone(),
    orders: store.clone(),
    gateway: gateway.clone(),
    config: Arc::new(config),
  };
  TestApp { state, store, gateway }
}

pub async fn seed_user(app: &TestApp, role: UserRole) -> User {
  let now = Utc::now();
  let user = User {
    id: Uuid::new_v4(),
    name: format!("{:?} user", role),
    email: format!("{}@example.com", Uuid::new_v4().simple()),
    role,
    created_at: now,
    updated_at: now,
  };
  app.state.accounts.insert_user(&user).await.unwrap();
  user
}

pub async fn seed_product(app: &TestApp, name: &str, price: &str, stock: i32) -> Product {
  seed_product_for(app, Uuid::new_v4(), name, price, stock, true).await
}

pub async fn seed_product_for(
  app: &TestApp,
  vendor_id: Uuid,
  name: &str,
  price: &str,
  stock: i32,
  is_active: bool,
) -> Product {
  let now = Utc::now();
  let product = Product {
    id: Uuid::new_v4(),
    vendor_id,
    name: name.to_string(),
    image: Some(format!("{}.jpg", name.replace(' ', "_"))),
    price: dec(price),
    stock,
    is_active,
    created_at: now,
    updated_at: now,
  };
  app.state.catalog.insert_product(&product).await.unwrap();
  product
}

pub fn shipping_address() -> ShippingAddress {
  ShippingAddress {
    full_name: "Ayesha Khan".to_string(),
    phone: "+923001234567".to_string(),
    street: "12-B Gulberg III".to_string(),
    city: "Lahore".to_string(),
    province: "Punjab".to_string(),
    zip: Some("54000".to_string()),
    country: "Pakistan".to_string(),
  }
}

/// A provider `checkout.session.completed` event envelope for `session_id`.
pub fn completed_checkout_event(session_id: &str, payment_intent: &str) -> Vec<u8> {
  serde_json::json!({
    "id": format!("evt_{}", Uuid::new_v4().simple()),
    "type": "checkout.session.completed",
    "data": {
      "object": {
        "id": session_id,
        "payment_intent": payment_intent,
        "amount_total": 0
      }
    }
  })
  .to_string()
  .into_bytes()
}

pub fn signed_header(payload: &[u8]) -> String {
  signature::sign_payload(payload, WEBHOOK_SECRET, Utc::now().timestamp())
}
