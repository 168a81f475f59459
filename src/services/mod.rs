// src/services/mod.rs

//! External collaborators: the payment gateway client and webhook signature
//! verification.

pub mod payment;
pub mod signature;
