// src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Insufficient stock for '{name}': {available} remaining")]
  InsufficientStock { name: String, available: i32 },

  #[error("Invalid status transition: {0}")]
  Conflict(String),

  #[error("Webhook signature verification failed: {0}")]
  SignatureInvalid(String),

  #[error("Payment provider error: {0}")]
  ExternalService(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// in functions that use `?` on anyhow results.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::InsufficientStock { name, available } => HttpResponse::BadRequest().json(json!({
        "error": format!("Insufficient stock for '{}'", name),
        "available": available,
      })),
      AppError::Conflict(m) => HttpResponse::Conflict().json(json!({"error": m})),
      AppError::SignatureInvalid(_) => {
        // Detail stays in the log; the provider only needs to know the payload was rejected.
        HttpResponse::BadRequest().json(json!({"error": "Invalid webhook signature"}))
      }
      AppError::ExternalService(_) => {
        // Retryable client error: nothing is broken server-side, the caller
        // can simply submit the checkout again.
        HttpResponse::Conflict().json(json!({"error": "Payment provider unavailable, please retry"}))
      }
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"})),
      AppError::Internal(_) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred"}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
