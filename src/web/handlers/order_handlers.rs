// src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::authz;
use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
  pub status: OrderStatus,
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user, path), fields(user_id = %auth_user.user_id, order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let actor = app_state
    .accounts
    .user_by_id(auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::Auth("Unknown user".to_string()))?;
  let order = app_state
    .orders
    .order_by_id(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

  if !authz::can_view_order(&actor, &order) {
    return Err(AppError::Forbidden("You may not view this order".to_string()));
  }
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[instrument(
    name = "handler::update_order_status",
    skip(app_state, auth_user, path, payload),
    fields(user_id = %auth_user.user_id, order_id = %path.as_ref(), next_status = ?payload.status)
)]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let next_status = payload.status;

  let actor = app_state
    .accounts
    .user_by_id(auth_user.user_id)
    .await?
    .ok_or_else(|| AppError::Auth("Unknown user".to_string()))?;
  let mut order = app_state
    .orders
    .order_by_id(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order_id)))?;

  if !authz::can_manage_order(&actor, &order) {
    return Err(AppError::Forbidden("You may not manage this order".to_string()));
  }

  // Pending -> Paid is owned by payment reconciliation; no actor sets it by
  // hand.
  if next_status == OrderStatus::Paid {
    return Err(AppError::Validation(
      "'paid' is set by payment confirmation, not by status updates".to_string(),
    ));
  }

  let prev_status = order.status;
  let now = Utc::now();
  order.transition_to(next_status, now)?;
  // Status-only persistence path; financial totals are never recomputed here.
  // The store applies the write only if the row is still in prev_status, so
  // a transition validated against a stale read (e.g. racing the payment
  // webhook) loses instead of clobbering.
  let applied = app_state
    .orders
    .update_status(order.id, prev_status, order.status, order.delivered_at, now)
    .await?;
  if !applied {
    return Err(AppError::Conflict(format!(
      "Order {} was updated concurrently; re-read and retry",
      order.id
    )));
  }

  info!(order_id = %order.id, status = ?order.status, "Order status updated");
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}
