// src/store/postgres.rs

//! sqlx-backed store implementations (runtime queries; see schema.sql for the
//! table and enum definitions). Orders persist line items and the shipping
//! address as JSONB documents on the order row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Order, OrderLineItem, OrderStatus, Product, ShippingAddress, User};
use crate::store::{AccountStore, CatalogStore, OrderStore, StockDecrement};

const ORDER_COLUMNS: &str = "id, customer_id, items, shipping_address, shipping_cost, subtotal, \
   platform_fee_total, total, commission_rate, status, is_paid, paid_at, is_delivered, delivered_at, \
   checkout_session_id, payment_intent_id, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresStore {
  pool: PgPool,
}

impl PostgresStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[derive(FromRow)]
struct OrderRow {
  id: Uuid,
  customer_id: Uuid,
  items: Json<Vec<OrderLineItem>>,
  shipping_address: Json<ShippingAddress>,
  shipping_cost: Decimal,
  subtotal: Decimal,
  platform_fee_total: Decimal,
  total: Decimal,
  commission_rate: Decimal,
  status: OrderStatus,
  is_paid: bool,
  paid_at: Option<DateTime<Utc>>,
  is_delivered: bool,
  delivered_at: Option<DateTime<Utc>>,
  checkout_session_id: Option<String>,
  payment_intent_id: Option<String>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
  fn from(row: OrderRow) -> Self {
    Order {
      id: row.id,
      customer_id: row.customer_id,
      items: row.items.0,
      shipping_address: row.shipping_address.0,
      shipping_cost: row.shipping_cost,
      subtotal: row.subtotal,
      platform_fee_total: row.platform_fee_total,
      total: row.total,
      commission_rate: row.commission_rate,
      status: row.status,
      is_paid: row.is_paid,
      paid_at: row.paid_at,
      is_delivered: row.is_delivered,
      delivered_at: row.delivered_at,
      checkout_session_id: row.checkout_session_id,
      payment_intent_id: row.payment_intent_id,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[async_trait]
impl CatalogStore for PostgresStore {
  async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
    let product: Option<Product> = sqlx::query_as(
      "SELECT id, vendor_id, name, image, price, stock, is_active, created_at, updated_at \
       FROM products WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(product)
  }

  async fn list_active_products(&self) -> Result<Vec<Product>> {
    let products: Vec<Product> = sqlx::query_as(
      "SELECT id, vendor_id, name, image, price, stock, is_active, created_at, updated_at \
       FROM products WHERE is_active = TRUE ORDER BY name ASC",
    )
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  async fn insert_product(&self, product: &Product) -> Result<()> {
    sqlx::query(
      "INSERT INTO products (id, vendor_id, name, image, price, stock, is_active, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(product.id)
    .bind(product.vendor_id)
    .bind(&product.name)
    .bind(&product.image)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<StockDecrement> {
    // Single statement: lock the row, subtract with a floor of zero, and
    // report the pre-update stock so the caller can tell a clean decrement
    // from a clamped one.
    let prev_stock: Option<i32> = sqlx::query_scalar(
      "WITH prev AS (SELECT stock FROM products WHERE id = $1 FOR UPDATE) \
       UPDATE products p SET stock = GREATEST(p.stock - $2, 0), updated_at = now() \
       FROM prev WHERE p.id = $1 \
       RETURNING prev.stock",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?;

    Ok(match prev_stock {
      None => StockDecrement::Missing,
      Some(prev) if prev >= quantity => StockDecrement::Applied,
      Some(prev) => StockDecrement::Clamped {
        shortfall: quantity - prev,
      },
    })
  }
}

#[async_trait]
impl AccountStore for PostgresStore {
  async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
    let user: Option<User> =
      sqlx::query_as("SELECT id, name, email, role, created_at, updated_at FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
    Ok(user)
  }

  async fn insert_user(&self, user: &User) -> Result<()> {
    sqlx::query("INSERT INTO users (id, name, email, role, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6)")
      .bind(user.id)
      .bind(&user.name)
      .bind(&user.email)
      .bind(user.role)
      .bind(user.created_at)
      .bind(user.updated_at)
      .execute(&self.pool)
      .await?;
    Ok(())
  }
}

#[async_trait]
impl OrderStore for PostgresStore {
  async fn insert_order(&self, order: &Order) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO orders ({ORDER_COLUMNS}) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
    ))
    .bind(order.id)
    .bind(order.customer_id)
    .bind(Json(&order.items))
    .bind(Json(&order.shipping_address))
    .bind(order.shipping_cost)
    .bind(order.subtotal)
    .bind(order.platform_fee_total)
    .bind(order.total)
    .bind(order.commission_rate)
    .bind(order.status)
    .bind(order.is_paid)
    .bind(order.paid_at)
    .bind(order.is_delivered)
    .bind(order.delivered_at)
    .bind(&order.checkout_session_id)
    .bind(&order.payment_intent_id)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Order::from))
  }

  async fn order_by_session(&self, session_id: &str) -> Result<Option<Order>> {
    let row: Option<OrderRow> =
      sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE checkout_session_id = $1"))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
    Ok(row.map(Order::from))
  }

  async fn attach_checkout_session(&self, id: Uuid, session_id: &str) -> Result<()> {
    sqlx::query("UPDATE orders SET checkout_session_id = $2, updated_at = now() WHERE id = $1")
      .bind(id)
      .bind(session_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn mark_paid(&self, id: Uuid, payment_intent_id: Option<&str>, paid_at: DateTime<Utc>) -> Result<bool> {
    // The WHERE status = 'pending' guard makes this a compare-and-swap:
    // concurrent redeliveries race on the same row and at most one wins.
    let result = sqlx::query(
      "UPDATE orders SET status = 'paid', is_paid = TRUE, paid_at = $2, payment_intent_id = $3, updated_at = $2 \
       WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .bind(paid_at)
    .bind(payment_intent_id)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }

  async fn update_status(
    &self,
    id: Uuid,
    expected: OrderStatus,
    status: OrderStatus,
    delivered_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
  ) -> Result<bool> {
    // Same compare-and-swap shape as mark_paid: a write validated against a
    // stale read matches zero rows instead of clobbering a concurrent
    // transition.
    let result = sqlx::query(
      "UPDATE orders SET status = $3, is_delivered = $4, delivered_at = $5, updated_at = $6 \
       WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(expected)
    .bind(status)
    .bind(delivered_at.is_some())
    .bind(delivered_at)
    .bind(updated_at)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() == 1)
  }
}
