// src/web/handlers/webhook_handlers.rs

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::webhook::{self, WebhookAck, SIGNATURE_HEADER};

/// Payment-provider notification endpoint.
///
/// Takes the body as `web::Bytes` so the byte-exact payload reaches
/// signature verification; routing this through a JSON extractor would
/// re-serialize and break the signature.
#[instrument(name = "handler::payment_webhook", skip(app_state, req, body), fields(payload_len = body.len()))]
pub async fn payment_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let signature_header = req.headers().get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());

  let ack = webhook::handle_payment_notification(app_state.get_ref(), &body, signature_header).await?;
  info!(ack = ?ack, "Payment notification acknowledged");

  // Anything verified is a 2xx, including accept-and-drop outcomes; the
  // provider retries on every other status.
  let status = match ack {
    WebhookAck::Processed { .. } => "processed",
    WebhookAck::AlreadyProcessed { .. } => "already_processed",
    WebhookAck::Ignored => "ignored",
  };
  Ok(HttpResponse::Ok().json(json!({ "status": status })))
}
