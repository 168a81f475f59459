// src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::checkout::{self, CheckoutRequest};
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(
    name = "handler::start_checkout",
    skip(app_state, auth_user, req_payload),
    fields(user_id = %auth_user.user_id)
)]
pub async fn start_checkout_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  req_payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  info!("Checkout initiation attempt by user: {}", auth_user.user_id);

  // Attribution check: the customer must be a known account.
  app_state
    .accounts
    .user_by_id(auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth_user.user_id)))?;

  let outcome = checkout::start_checkout(app_state.get_ref(), auth_user.user_id, req_payload.into_inner()).await?;
  info!(
    "Checkout initiated for user {}. Order ID: {}",
    auth_user.user_id, outcome.order_id
  );
  Ok(HttpResponse::Created().json(outcome))
}
