// src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub app_base_url: String,

  // Payment provider
  pub payment_secret_key: String,
  pub payment_webhook_secret: String,
  pub checkout_success_url: String,
  pub checkout_cancel_url: String,

  // Platform commission, as a fraction of item revenue (e.g. "0.10")
  pub commission_rate: Decimal,

  // Single-currency system; amounts are stored in major units of this code.
  pub currency: String,

  // Optional: seed demo catalog on startup
  pub seed_db: bool,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", server_host, server_port));

    let payment_secret_key = get_env("PAYMENT_SECRET_KEY")?;
    let payment_webhook_secret = get_env("PAYMENT_WEBHOOK_SECRET")?;
    let checkout_success_url =
      get_env("CHECKOUT_SUCCESS_URL").unwrap_or_else(|_| format!("{}/checkout/success", app_base_url));
    let checkout_cancel_url =
      get_env("CHECKOUT_CANCEL_URL").unwrap_or_else(|_| format!("{}/checkout/cancel", app_base_url));

    let commission_rate_raw = get_env("COMMISSION_RATE").unwrap_or_else(|_| "0.10".to_string());
    let commission_rate = Decimal::from_str(&commission_rate_raw)
      .map_err(|e| AppError::Config(format!("Invalid COMMISSION_RATE '{}': {}", commission_rate_raw, e)))?;
    if commission_rate < Decimal::ZERO || commission_rate > Decimal::ONE {
      return Err(AppError::Config(format!(
        "COMMISSION_RATE must be within [0, 1], got {}",
        commission_rate
      )));
    }

    let currency = get_env("CURRENCY").unwrap_or_else(|_| "PKR".to_string());

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      payment_secret_key,
      payment_webhook_secret,
      checkout_success_url,
      checkout_cancel_url,
      commission_rate,
      currency,
      seed_db,
    })
  }
}
