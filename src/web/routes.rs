// src/web/routes.rs

use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called from `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      // Health Check Route
      .route("/health", web::get().to(health_check_handler))
      // Catalog Routes (read-only surface; vendor CRUD lives upstream)
      .service(
        web::scope("/products")
          .route(
            "",
            web::get().to(crate::web::handlers::product_handlers::list_products_handler),
          )
          .route(
            "/{product_id}",
            web::get().to(crate::web::handlers::product_handlers::get_product_handler),
          ),
      )
      // Checkout Routes
      .service(web::scope("/checkout").route(
        "",
        web::post().to(crate::web::handlers::checkout_handlers::start_checkout_handler),
      ))
      // Webhook Routes. Registered on the raw-bytes handler: no body-parsing
      // middleware may run ahead of signature verification.
      .service(web::scope("/webhooks").route(
        "/payments",
        web::post().to(crate::web::handlers::webhook_handlers::payment_webhook_handler),
      ))
      // Order Routes
      .service(
        web::scope("/orders")
          .route(
            "/{order_id}",
            web::get().to(crate::web::handlers::order_handlers::get_order_handler),
          )
          .route(
            "/{order_id}/status",
            web::put().to(crate::web::handlers::order_handlers::update_order_status_handler),
          ),
      ),
  );
}
