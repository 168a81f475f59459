// src/store/memory.rs

//! In-memory store implementation. Plays the same role the in-crate mock
//! collaborators do for the payment gateway: integration tests and the demo
//! seed path run against it without a database. Conditional-update semantics
//! (stock clamp, Pending -> Paid guard) match the Postgres implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Order, OrderStatus, Product, User};
use crate::store::{AccountStore, CatalogStore, OrderStore, StockDecrement};

#[derive(Default)]
pub struct MemoryStore {
  products: RwLock<HashMap<Uuid, Product>>,
  users: RwLock<HashMap<Uuid, User>>,
  orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of persisted orders. Lets tests assert that failed checkouts are
  /// all-or-nothing and leave no order behind.
  pub async fn order_count(&self) -> usize {
    self.orders.read().await.len()
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.products.read().await.get(&id).cloned())
  }

  async fn list_active_products(&self) -> Result<Vec<Product>> {
    let mut active: Vec<Product> = self
      .products
      .read()
      .await
      .values()
      .filter(|p| p.is_active)
      .cloned()
      .collect();
    active.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(active)
  }

  async fn insert_product(&self, product: &Product) -> Result<()> {
    self.products.write().await.insert(product.id, product.clone());
    Ok(())
  }

  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<StockDecrement> {
    let mut products = self.products.write().await;
    let Some(product) = products.get_mut(&id) else {
      return Ok(StockDecrement::Missing);
    };
    // Check and subtract under the same write lock, like the single-statement
    // conditional UPDATE in the Postgres implementation.
    if product.stock >= quantity {
      product.stock -= quantity;
      product.updated_at = Utc::now();
      Ok(StockDecrement::Applied)
    } else {
      let shortfall = quantity - product.stock;
      product.stock = 0;
      product.updated_at = Utc::now();
      Ok(StockDecrement::Clamped { shortfall })
    }
  }
}

#[async_trait]
impl AccountStore for MemoryStore {
  async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.users.read().await.get(&id).cloned())
  }

  async fn insert_user(&self, user: &User) -> Result<()> {
    self.users.write().await.insert(user.id, user.clone());
    Ok(())
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  async fn insert_order(&self, order: &Order) -> Result<()> {
    self.orders.write().await.insert(order.id, order.clone());
    Ok(())
  }

  async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.orders.read().await.get(&id).cloned())
  }

  async fn order_by_session(&self, session_id: &str) -> Result<Option<Order>> {
    Ok(
      self
        .orders
        .read()
        .await
        .values()
        .find(|o| o.checkout_session_id.as_deref() == Some(session_id))
        .cloned(),
    )
  }

  async fn attach_checkout_session(&self, id: Uuid, session_id: &str) -> Result<()> {
    let mut orders = self.orders.write().await;
    if let Some(order) = orders.get_mut(&id) {
      order.checkout_session_id = Some(session_id.to_string());
      order.updated_at = Utc::now();
    }
    Ok(())
  }

  async fn mark_paid(&self, id: Uuid, payment_intent_id: Option<&str>, paid_at: DateTime<Utc>) -> Result<bool> {
    let mut orders = self.orders.write().await;
    let Some(order) = orders.get_mut(&id) else {
      return Ok(false);
    };
    // The whole check-then-mutate sequence holds the write lock, so two
    // concurrent deliveries cannot both win.
    if order.status != OrderStatus::Pending {
      return Ok(false);
    }
    order.status = OrderStatus::Paid;
    order.is_paid = true;
    order.paid_at = Some(paid_at);
    order.payment_intent_id = payment_intent_id.map(String::from);
    order.updated_at = paid_at;
    Ok(true)
  }

  async fn update_status(
    &self,
    id: Uuid,
    expected: OrderStatus,
    status: OrderStatus,
    delivered_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
  ) -> Result<bool> {
    let mut orders = self.orders.write().await;
    let Some(order) = orders.get_mut(&id) else {
      return Ok(false);
    };
    // Checked and written under the same write lock, like the conditional
    // UPDATE in the Postgres implementation.
    if order.status != expected {
      return Ok(false);
    }
    order.status = status;
    order.is_delivered = delivered_at.is_some();
    order.delivered_at = delivered_at;
    order.updated_at = updated_at;
    Ok(true)
  }
}
