// src/webhook.rs

//! Payment reconciliation: the sole writer of the Pending -> Paid transition
//! and the sole trigger of stock decrement. The provider delivers
//! notifications at least once; `OrderStore::mark_paid` is the idempotency
//! guard that makes redelivery a no-op before any stock is touched.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::services::signature;
use crate::state::AppState;
use crate::store::StockDecrement;

/// Header carrying the provider's `t=,v1=` signature.
pub const SIGNATURE_HEADER: &str = "provider-signature";

const CHECKOUT_COMPLETED_EVENT: &str = "checkout.session.completed";

// The provider's event envelope. Only `type` and `data.object.{id,
// payment_intent}` are read; everything else passes through untouched.
#[derive(Debug, Deserialize)]
struct ProviderEvent {
  #[serde(rename = "type")]
  kind: String,
  data: ProviderEventData,
}

#[derive(Debug, Deserialize)]
struct ProviderEventData {
  object: ProviderEventObject,
}

#[derive(Debug, Deserialize)]
struct ProviderEventObject {
  id: String,
  #[serde(default)]
  payment_intent: Option<String>,
}

/// How a verified notification was resolved. Every variant is acknowledged
/// with a success status so the provider stops redelivering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAck {
  /// Order transitioned to Paid and stock was decremented.
  Processed { order_id: Uuid },
  /// Redelivery of an event this system already applied.
  AlreadyProcessed { order_id: Uuid },
  /// Verified but not actionable: unrelated event type, or a session this
  /// system does not recognize (accept-and-drop).
  Ignored,
}

/// Handle an inbound payment notification.
///
/// `raw_payload` must be the byte-exact request body; signature verification
/// happens before the payload is parsed or trusted in any way, and fails
/// closed.
#[instrument(skip(state, raw_payload, signature_header), fields(payload_len = raw_payload.len()))]
pub async fn handle_payment_notification(
  state: &AppState,
  raw_payload: &[u8],
  signature_header: Option<&str>,
) -> Result<WebhookAck> {
  let sig_header =
    signature_header.ok_or_else(|| AppError::SignatureInvalid("missing signature header".to_string()))?;
  signature::verify_signature(raw_payload, sig_header, &state.config.payment_webhook_secret)?;

  // A verified payload that does not parse will never parse on redelivery;
  // acknowledge it so the provider stops retrying. Error statuses are
  // reserved for failures a retry can actually cure.
  let event: ProviderEvent = match serde_json::from_slice(raw_payload) {
    Ok(event) => event,
    Err(e) => {
      warn!(error = %e, "Verified payload does not parse; acknowledging and dropping");
      return Ok(WebhookAck::Ignored);
    }
  };

  if event.kind != CHECKOUT_COMPLETED_EVENT {
    info!(event_type = %event.kind, "Ignoring unrelated provider event");
    return Ok(WebhookAck::Ignored);
  }

  let session_id = event.data.object.id;
  let order = match state.orders.order_by_session(&session_id).await? {
    Some(order) => order,
    None => {
      // Deliberate accept-and-drop: a stale or foreign session must not keep
      // the provider retrying forever.
      warn!(session_id = %session_id, "Completed checkout for unknown session; acknowledging and dropping");
      return Ok(WebhookAck::Ignored);
    }
  };

  let payment_intent = event.data.object.payment_intent;
  let transitioned = state
    .orders
    .mark_paid(order.id, payment_intent.as_deref(), Utc::now())
    .await?;
  if !transitioned {
    info!(order_id = %order.id, "Order already paid; duplicate delivery acknowledged without stock mutation");
    return Ok(WebhookAck::AlreadyProcessed { order_id: order.id });
  }
  info!(order_id = %order.id, session_id = %session_id, "Order marked paid");

  // Runs at most once per order thanks to the mark_paid guard above.
  for item in &order.items {
    match state.catalog.decrement_stock(item.product_id, item.quantity).await? {
      StockDecrement::Applied => {}
      StockDecrement::Clamped { shortfall } => {
        warn!(
          order_id = %order.id,
          product_id = %item.product_id,
          shortfall,
          "Oversold line clamped at zero stock; needs manual reconciliation"
        );
      }
      StockDecrement::Missing => {
        warn!(
          order_id = %order.id,
          product_id = %item.product_id,
          "Paid line references a product that no longer exists"
        );
      }
    }
  }

  Ok(WebhookAck::Processed { order_id: order.id })
}
