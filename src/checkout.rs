// src/checkout.rs

//! Checkout orchestration: turns a cart into a Pending order with an open
//! payment session. Stock is checked here but only reserved at payment
//! confirmation (see `webhook`), so overselling between the two points is
//! possible by design and mitigated at decrement time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderLineItem, ShippingAddress};
use crate::money;
use crate::services::payment::CheckoutSessionRequest;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
  pub items: Vec<CartLine>,
  pub shipping_address: ShippingAddress,
  #[serde(default)]
  pub shipping_cost: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
  pub order_id: Uuid,
  pub session_url: String,
}

#[instrument(skip(state, request), fields(customer_id = %customer_id, lines = request.items.len()))]
pub async fn start_checkout(state: &AppState, customer_id: Uuid, request: CheckoutRequest) -> Result<CheckoutOutcome> {
  if request.items.is_empty() {
    return Err(AppError::Validation("Cart must contain at least one item".to_string()));
  }
  for line in &request.items {
    if line.quantity < 1 {
      return Err(AppError::Validation(format!(
        "Quantity for product {} must be at least 1",
        line.product_id
      )));
    }
  }
  request.shipping_address.validate()?;
  let shipping_cost = request.shipping_cost.unwrap_or(Decimal::ZERO);
  if shipping_cost < Decimal::ZERO {
    return Err(AppError::Validation("Shipping cost must be non-negative".to_string()));
  }

  // All-or-nothing validation pass against the live catalog. Any failure
  // aborts before an order document exists. Snapshots capture the
  // authoritative price; anything price-like submitted by the client is
  // simply never read.
  let commission_rate = state.config.commission_rate;
  let mut snapshots: Vec<OrderLineItem> = Vec::with_capacity(request.items.len());
  for line in &request.items {
    let product = state
      .catalog
      .product_by_id(line.product_id)
      .await?
      .filter(|p| p.is_active)
      .ok_or_else(|| AppError::NotFound(format!("Product {} not found", line.product_id)))?;
    if product.stock < line.quantity {
      return Err(AppError::InsufficientStock {
        name: product.name,
        available: product.stock,
      });
    }
    snapshots.push(OrderLineItem::snapshot(&product, line.quantity, commission_rate));
  }

  let order = Order::from_cart(
    customer_id,
    snapshots,
    request.shipping_address,
    shipping_cost,
    commission_rate,
  );
  state.orders.insert_order(&order).await?;
  info!(order_id = %order.id, total = %order.total, "Pending order persisted");

  // Open the external payment session for the computed total, in minor
  // units. If this fails the Pending order stays behind without a session
  // id: never payable, safe to ignore.
  let session = state
    .gateway
    .create_checkout_session(&CheckoutSessionRequest {
      order_id: order.id,
      amount_minor: money::to_minor_units(order.total),
      currency: state.config.currency.clone(),
      success_url: state.config.checkout_success_url.clone(),
      cancel_url: state.config.checkout_cancel_url.clone(),
    })
    .await
    .map_err(|e| {
      warn!(order_id = %order.id, error = %e, "Payment session creation failed; order left Pending without session");
      e
    })?;

  // Metadata-only update; financial fields are untouched.
  state.orders.attach_checkout_session(order.id, &session.id).await?;
  info!(order_id = %order.id, session_id = %session.id, "Checkout session attached");

  Ok(CheckoutOutcome {
    order_id: order.id,
    session_url: session.url,
  })
}
