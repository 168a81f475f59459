// src/models/order.rs

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type as SqlxType;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::Product;
use crate::money;

// Matches schema.sql's order_status_enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Paid,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
  Refunded,
}

impl OrderStatus {
  /// Closed transition table for the order lifecycle. Anything not listed
  /// here is rejected, including every move out of a terminal state.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Paid)
        | (Pending, Cancelled)
        | (Paid, Processing)
        | (Paid, Cancelled)
        | (Paid, Refunded)
        | (Processing, Shipped)
        | (Shipped, Delivered)
    )
  }
}

fn pk_mobile_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  // Pakistani mobile numbers: +92 3XX XXXXXXX or 03XX XXXXXXX.
  PATTERN.get_or_init(|| Regex::new(r"^(?:\+92|0)3[0-9]{9}$").expect("static phone pattern"))
}

fn default_country() -> String {
  "Pakistan".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
  pub full_name: String,
  pub phone: String,
  pub street: String,
  pub city: String,
  pub province: String,
  #[serde(default)]
  pub zip: Option<String>,
  #[serde(default = "default_country")]
  pub country: String,
}

impl ShippingAddress {
  pub fn validate(&self) -> Result<()> {
    for (field, value) in [
      ("full_name", &self.full_name),
      ("street", &self.street),
      ("city", &self.city),
      ("province", &self.province),
    ] {
      if value.trim().is_empty() {
        return Err(AppError::Validation(format!("Shipping address field '{}' is required", field)));
      }
    }
    if !pk_mobile_pattern().is_match(&self.phone) {
      return Err(AppError::Validation(format!(
        "Invalid phone number '{}': expected a Pakistani mobile number",
        self.phone
      )));
    }
    Ok(())
  }
}

/// A point-in-time snapshot of a product at order time, plus the derived
/// revenue split. Never re-read from the live product after creation, so
/// later catalog edits cannot alter historic orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
  pub product_id: Uuid,
  pub vendor_id: Uuid,
  pub name: String,
  pub image: Option<String>,
  pub unit_price: Decimal,
  pub quantity: i32,
  pub item_revenue: Decimal,
  pub platform_fee: Decimal,
  pub vendor_payout: Decimal,
}

impl OrderLineItem {
  pub fn snapshot(product: &Product, quantity: i32, commission_rate: Decimal) -> Self {
    let split = money::split_line(product.price, quantity, commission_rate);
    Self {
      product_id: product.id,
      vendor_id: product.vendor_id,
      name: product.name.clone(),
      image: product.image.clone(),
      unit_price: product.price,
      quantity,
      item_revenue: split.item_revenue,
      platform_fee: split.platform_fee,
      vendor_payout: split.vendor_payout,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub items: Vec<OrderLineItem>,
  pub shipping_address: ShippingAddress,
  pub shipping_cost: Decimal,
  pub subtotal: Decimal,
  pub platform_fee_total: Decimal,
  pub total: Decimal,
  /// Captured at creation; later platform rate changes never touch this order.
  pub commission_rate: Decimal,
  pub status: OrderStatus,
  pub is_paid: bool,
  pub paid_at: Option<DateTime<Utc>>,
  pub is_delivered: bool,
  pub delivered_at: Option<DateTime<Utc>>,
  /// Correlation token of the external payment session, once opened.
  pub checkout_session_id: Option<String>,
  pub payment_intent_id: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Build a new Pending order from line-item snapshots. The only place
  /// financial totals are (re)computed.
  pub fn from_cart(
    customer_id: Uuid,
    items: Vec<OrderLineItem>,
    shipping_address: ShippingAddress,
    shipping_cost: Decimal,
    commission_rate: Decimal,
  ) -> Self {
    let now = Utc::now();
    let mut order = Self {
      id: Uuid::new_v4(),
      customer_id,
      items,
      shipping_address,
      shipping_cost,
      subtotal: Decimal::ZERO,
      platform_fee_total: Decimal::ZERO,
      total: Decimal::ZERO,
      commission_rate,
      status: OrderStatus::Pending,
      is_paid: false,
      paid_at: None,
      is_delivered: false,
      delivered_at: None,
      checkout_session_id: None,
      payment_intent_id: None,
      created_at: now,
      updated_at: now,
    };
    order.recompute_totals();
    order
  }

  /// Re-derive `subtotal`/`platform_fee_total`/`total` from the line items.
  ///
  /// Called only when line items change (in practice: once, at creation).
  /// Status and payment updates persist through dedicated store operations
  /// that never touch these fields.
  pub fn recompute_totals(&mut self) {
    let splits: Vec<money::LineSplit> = self
      .items
      .iter()
      .map(|item| money::LineSplit {
        item_revenue: item.item_revenue,
        platform_fee: item.platform_fee,
        vendor_payout: item.vendor_payout,
      })
      .collect();
    let totals = money::order_totals(splits.iter(), self.shipping_cost);
    self.subtotal = totals.subtotal;
    self.platform_fee_total = totals.platform_fee_total;
    self.total = totals.total;
  }

  /// Apply a lifecycle transition, enforcing the transition table.
  ///
  /// The `is_paid`/`paid_at` and `is_delivered`/`delivered_at` companion
  /// pairs are set exactly once, when the corresponding status is first
  /// reached.
  pub fn transition_to(&mut self, next: OrderStatus, now: DateTime<Utc>) -> Result<()> {
    if !self.status.can_transition_to(next) {
      return Err(AppError::Conflict(format!(
        "Order {} cannot move from {:?} to {:?}",
        self.id, self.status, next
      )));
    }
    self.status = next;
    self.updated_at = now;
    match next {
      OrderStatus::Paid if !self.is_paid => {
        self.is_paid = true;
        self.paid_at = Some(now);
      }
      OrderStatus::Delivered if !self.is_delivered => {
        self.is_delivered = true;
        self.delivered_at = Some(now);
      }
      _ => {}
    }
    Ok(())
  }
}
