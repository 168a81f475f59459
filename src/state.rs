// src/state.rs

use crate::config::AppConfig;
use crate::services::payment::PaymentGateway;
use crate::store::{AccountStore, CatalogStore, OrderStore};
use std::sync::Arc;

/// Shared per-process handles. All shared state lives behind the store
/// traits; there is no in-process mutable cache.
#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<dyn CatalogStore>,
  pub accounts: Arc<dyn AccountStore>,
  pub orders: Arc<dyn OrderStore>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub config: Arc<AppConfig>,
}
