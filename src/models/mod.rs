// src/models/mod.rs

//! Data structures for catalog, account and order-ledger entities.

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderLineItem, OrderStatus, ShippingAddress};
pub use product::Product;
pub use user::{User, UserRole};
