// src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use uuid::Uuid;

use bazaarhub::config::AppConfig;
use bazaarhub::errors::Result as AppResult;
use bazaarhub::models::{Product, User, UserRole};
use bazaarhub::services::payment::RestPaymentGateway;
use bazaarhub::state::AppState;
use bazaarhub::store::postgres::PostgresStore;
use bazaarhub::store::{AccountStore, CatalogStore};
use bazaarhub::web::routes::configure_app_routes;

const PAYMENT_API_BASE: &str = "https://api.stripe.com";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting bazaarhub server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  let db_pool = match PgPool::connect(&app_config.database_url).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      panic!("Database connection error: {}", e);
    }
  };

  let store = Arc::new(PostgresStore::new(db_pool));
  let gateway = Arc::new(RestPaymentGateway::new(
    app_config.payment_secret_key.clone(),
    PAYMENT_API_BASE.to_string(),
  ));

  let app_state = AppState {
    catalog: store.clone(),
    accounts: store.clone(),
    orders: store,
    gateway,
    config: app_config.clone(),
  };

  if app_config.seed_db {
    if let Err(e) = seed_demo_catalog(&app_state).await {
      tracing::error!(error = %e, "Failed to seed demo catalog.");
    }
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}

/// Insert a demo vendor and a couple of products so a fresh database has
/// something to check out against.
async fn seed_demo_catalog(state: &AppState) -> AppResult<()> {
  let now = Utc::now();
  let vendor = User {
    id: Uuid::new_v4(),
    name: "Demo Vendor".to_string(),
    email: "vendor@example.com".to_string(),
    role: UserRole::Vendor,
    created_at: now,
    updated_at: now,
  };
  state.accounts.insert_user(&vendor).await?;

  for (name, price, stock) in [
    ("Multani blue pottery vase", "1800", 12),
    ("Hand-knotted wool rug", "14500", 3),
    ("Truck-art tea set", "2650.50", 20),
  ] {
    let product = Product {
      id: Uuid::new_v4(),
      vendor_id: vendor.id,
      name: name.to_string(),
      image: None,
      price: price.parse::<Decimal>().unwrap_or(Decimal::ZERO),
      stock,
      is_active: true,
      created_at: now,
      updated_at: now,
    };
    state.catalog.insert_product(&product).await?;
  }
  tracing::info!("Demo catalog seeded.");
  Ok(())
}
