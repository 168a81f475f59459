// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A catalog product owned by a vendor account.
///
/// `is_active = false` is a soft delete: the product disappears from the
/// catalog and becomes unorderable, but historic order snapshots keep
/// referencing it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub vendor_id: Uuid,
  pub name: String,
  pub image: Option<String>,
  /// Unit price in major units of the system currency.
  pub price: Decimal,
  pub stock: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
