// src/lib.rs

//! Multi-vendor e-commerce backend: catalog and account stores, the order
//! ledger with its commission invariants, checkout orchestration against an
//! external payment provider, and idempotent payment-webhook reconciliation.

pub mod authz;
pub mod checkout;
pub mod config;
pub mod errors;
pub mod models;
pub mod money;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
pub mod webhook;
