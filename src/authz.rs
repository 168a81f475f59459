// src/authz.rs

//! Centralized capability checks. Route handlers never compare roles inline;
//! they ask these predicates instead.

use crate::models::{Order, Product, User, UserRole};

/// May the actor manage (update status of) this order? Admins always;
/// vendors only for orders containing at least one of their items.
pub fn can_manage_order(actor: &User, order: &Order) -> bool {
  match actor.role {
    UserRole::Admin => true,
    UserRole::Vendor => order.items.iter().any(|item| item.vendor_id == actor.id),
    UserRole::Customer => false,
  }
}

/// May the actor read this order? Managers plus the owning customer.
pub fn can_view_order(actor: &User, order: &Order) -> bool {
  order.customer_id == actor.id || can_manage_order(actor, order)
}

pub fn can_manage_product(actor: &User, product: &Product) -> bool {
  match actor.role {
    UserRole::Admin => true,
    UserRole::Vendor => product.vendor_id == actor.id,
    UserRole::Customer => false,
  }
}
