//! HTTP endpoints.

pub mod events;
pub mod generate;
pub mod health;
pub mod orders;
pub mod payments;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(health::metrics_endpoint)
        .service(orders::create_order)
        .service(payments::verify_payment)
        .service(generate::generate)
        .service(generate::chat)
        .service(events::events);
}
