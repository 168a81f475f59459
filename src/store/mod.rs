// src/store/mod.rs

//! Persistence interfaces the core consumes. The order/checkout/webhook logic
//! only ever talks to these traits; `postgres` implements them against the
//! database and `memory` backs tests and demo seeding.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Order, OrderStatus, Product, User};

/// Outcome of the atomic conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecrement {
  /// Full quantity subtracted.
  Applied,
  /// Stock was short: clamped to zero, `shortfall` units remain unfulfilled
  /// and need manual reconciliation.
  Clamped { shortfall: i32 },
  /// No such product row.
  Missing,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>>;
  async fn list_active_products(&self) -> Result<Vec<Product>>;
  async fn insert_product(&self, product: &Product) -> Result<()>;
  /// Atomically subtract `quantity`, clamping at zero rather than going
  /// negative. Never a blind decrement; see `StockDecrement`.
  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<StockDecrement>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
  async fn user_by_id(&self, id: Uuid) -> Result<Option<User>>;
  async fn insert_user(&self, user: &User) -> Result<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert_order(&self, order: &Order) -> Result<()>;
  async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>>;
  /// Look up the order correlated with an external checkout session.
  async fn order_by_session(&self, session_id: &str) -> Result<Option<Order>>;
  /// Metadata-only update after the payment session is opened. Touches no
  /// financial or status fields.
  async fn attach_checkout_session(&self, id: Uuid, session_id: &str) -> Result<()>;
  /// Conditional Pending -> Paid transition, the idempotency guard for
  /// webhook redelivery. Returns true iff this call performed the
  /// transition; a second delivery sees false and must not mutate stock.
  async fn mark_paid(&self, id: Uuid, payment_intent_id: Option<&str>, paid_at: DateTime<Utc>) -> Result<bool>;
  /// Persist a lifecycle transition already validated against the
  /// transition table. Writes status and the delivered companion pair only,
  /// and only if the row is still in `expected`: returns true iff this call
  /// performed the update, false when a concurrent writer moved the order
  /// first and the caller's validation is stale.
  async fn update_status(
    &self,
    id: Uuid,
    expected: OrderStatus,
    status: OrderStatus,
    delivered_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
  ) -> Result<bool>;
}
