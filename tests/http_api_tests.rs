// tests/http_api_tests.rs
//
// Route-level tests through the actix service: the AuthenticatedUser
// extractor, the status-update endpoint's capability and transition checks,
// and the raw-bytes webhook wiring.

mod common;

use actix_web::{test, web, App};
use common::*;
use serde_json::json;
use uuid::Uuid;

use bazaarhub::checkout::{start_checkout, CartLine, CheckoutRequest};
use bazaarhub::models::{Order, OrderStatus, UserRole};
use bazaarhub::store::OrderStore;
use bazaarhub::web::routes::configure_app_routes;

// Every test spins the full route tree up against the shared test state.
macro_rules! service {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state))
        .configure(configure_app_routes),
    )
    .await
  };
}

async fn place_order(app: &TestApp, customer_id: Uuid, vendor_id: Uuid) -> Order {
  let product = seed_product_for(app, vendor_id, "Jade bowl", "1500", 10, true).await;
  let outcome = start_checkout(
    &app.state,
    customer_id,
    CheckoutRequest {
      items: vec![CartLine {
        product_id: product.id,
        quantity: 1,
      }],
      shipping_address: shipping_address(),
      shipping_cost: None,
    },
  )
  .await
  .unwrap();
  app.state.orders.order_by_id(outcome.order_id).await.unwrap().unwrap()
}

#[actix_web::test]
async fn checkout_endpoint_requires_identity_header() {
  let app = test_app();
  let srv = service!(app.state.clone());

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .set_json(json!({ "items": [], "shipping_address": shipping_address() }))
    .to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn checkout_endpoint_returns_order_and_session_url() {
  let app = test_app();
  let customer = seed_user(&app, UserRole::Customer).await;
  let product = seed_product(&app, "Jade bowl", "1500", 10).await;
  let srv = service!(app.state.clone());

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .insert_header(("X-User-ID", customer.id.to_string()))
    .set_json(json!({
      "items": [{ "product_id": product.id, "quantity": 2 }],
      "shipping_address": shipping_address(),
      "shipping_cost": "200",
    }))
    .to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 201);

  let body: serde_json::Value = test::read_body_json(resp).await;
  assert!(body["orderId"].is_string());
  assert!(body["sessionUrl"].as_str().unwrap().starts_with("https://"));
}

#[actix_web::test]
async fn status_update_is_forbidden_for_customers_and_foreign_vendors() {
  let app = test_app();
  let customer = seed_user(&app, UserRole::Customer).await;
  let vendor = seed_user(&app, UserRole::Vendor).await;
  let other_vendor = seed_user(&app, UserRole::Vendor).await;
  let order = place_order(&app, customer.id, vendor.id).await;
  let srv = service!(app.state.clone());

  for actor in [customer.id, other_vendor.id] {
    let req = test::TestRequest::put()
      .uri(&format!("/api/v1/orders/{}/status", order.id))
      .insert_header(("X-User-ID", actor.to_string()))
      .set_json(json!({ "status": "cancelled" }))
      .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), 403);
  }
}

#[actix_web::test]
async fn vendor_walks_order_through_fulfillment() {
  let app = test_app();
  let customer = seed_user(&app, UserRole::Customer).await;
  let vendor = seed_user(&app, UserRole::Vendor).await;
  let order = place_order(&app, customer.id, vendor.id).await;

  // Pay via the reconciliation path first; fulfillment statuses start at Paid.
  let session_id = order.checkout_session_id.clone().unwrap();
  let payload = completed_checkout_event(&session_id, "pi_http");
  bazaarhub::webhook::handle_payment_notification(&app.state, &payload, Some(&signed_header(&payload)))
    .await
    .unwrap();

  let srv = service!(app.state.clone());
  for status in ["processing", "shipped", "delivered"] {
    let req = test::TestRequest::put()
      .uri(&format!("/api/v1/orders/{}/status", order.id))
      .insert_header(("X-User-ID", vendor.id.to_string()))
      .set_json(json!({ "status": status }))
      .to_request();
    let resp = test::call_service(&srv, req).await;
    assert_eq!(resp.status(), 200, "transition to {} failed", status);
  }

  let delivered = app.state.orders.order_by_id(order.id).await.unwrap().unwrap();
  assert_eq!(delivered.status, OrderStatus::Delivered);
  assert!(delivered.is_delivered);
  assert!(delivered.delivered_at.is_some());
}

#[actix_web::test]
async fn status_update_rejects_paid_and_illegal_transitions() {
  let app = test_app();
  let customer = seed_user(&app, UserRole::Customer).await;
  let admin = seed_user(&app, UserRole::Admin).await;
  let vendor = seed_user(&app, UserRole::Vendor).await;
  let order = place_order(&app, customer.id, vendor.id).await;
  let srv = service!(app.state.clone());

  // Paid is webhook-only, even for admins.
  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/orders/{}/status", order.id))
    .insert_header(("X-User-ID", admin.id.to_string()))
    .set_json(json!({ "status": "paid" }))
    .to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 400);

  // Pending -> Shipped is not in the transition table.
  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/orders/{}/status", order.id))
    .insert_header(("X-User-ID", admin.id.to_string()))
    .set_json(json!({ "status": "shipped" }))
    .to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 409);

  let unchanged = app.state.orders.order_by_id(order.id).await.unwrap().unwrap();
  assert_eq!(unchanged.status, OrderStatus::Pending);
}

#[actix_web::test]
async fn customer_can_view_own_order_only() {
  let app = test_app();
  let customer = seed_user(&app, UserRole::Customer).await;
  let stranger = seed_user(&app, UserRole::Customer).await;
  let order = place_order(&app, customer.id, Uuid::new_v4()).await;
  let srv = service!(app.state.clone());

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", order.id))
    .insert_header(("X-User-ID", customer.id.to_string()))
    .to_request();
  assert_eq!(test::call_service(&srv, req).await.status(), 200);

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", order.id))
    .insert_header(("X-User-ID", stranger.id.to_string()))
    .to_request();
  assert_eq!(test::call_service(&srv, req).await.status(), 403);
}

#[actix_web::test]
async fn webhook_route_delivers_raw_bytes_to_verification() {
  let app = test_app();
  let customer = seed_user(&app, UserRole::Customer).await;
  let order = place_order(&app, customer.id, Uuid::new_v4()).await;
  let session_id = order.checkout_session_id.clone().unwrap();
  let payload = completed_checkout_event(&session_id, "pi_raw");
  let srv = service!(app.state.clone());

  // Valid signature over the exact bytes: processed.
  let req = test::TestRequest::post()
    .uri("/api/v1/webhooks/payments")
    .insert_header(("provider-signature", signed_header(&payload)))
    .set_payload(payload.clone())
    .to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 200);
  let body: serde_json::Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "processed");

  // Bad signature: rejected with a client error, no retry-suppressing 2xx.
  let req = test::TestRequest::post()
    .uri("/api/v1/webhooks/payments")
    .insert_header(("provider-signature", "t=1,v1=00"))
    .set_payload(payload)
    .to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn gateway_failure_surfaces_as_retryable_client_error() {
  let app = test_app();
  let customer = seed_user(&app, UserRole::Customer).await;
  let product = seed_product(&app, "Vase", "800", 10).await;
  app.gateway.fail_next();
  let srv = service!(app.state.clone());

  let req = test::TestRequest::post()
    .uri("/api/v1/checkout")
    .insert_header(("X-User-ID", customer.id.to_string()))
    .set_json(json!({
      "items": [{ "product_id": product.id, "quantity": 1 }],
      "shipping_address": shipping_address(),
    }))
    .to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 409);
}

#[actix_web::test]
async fn inactive_products_are_hidden_from_catalog_reads() {
  let app = test_app();
  let active = seed_product(&app, "Visible vase", "500", 5).await;
  let hidden = seed_product_for(&app, Uuid::new_v4(), "Hidden vase", "500", 5, false).await;
  let srv = service!(app.state.clone());

  let req = test::TestRequest::get().uri("/api/v1/products").to_request();
  let resp = test::call_service(&srv, req).await;
  assert_eq!(resp.status(), 200);
  let body: serde_json::Value = test::read_body_json(resp).await;
  let names: Vec<&str> = body["products"]
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["name"].as_str().unwrap())
    .collect();
  assert!(names.contains(&"Visible vase"));
  assert!(!names.contains(&"Hidden vase"));

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/products/{}", hidden.id))
    .to_request();
  assert_eq!(test::call_service(&srv, req).await.status(), 404);

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/products/{}", active.id))
    .to_request();
  assert_eq!(test::call_service(&srv, req).await.status(), 200);
}
