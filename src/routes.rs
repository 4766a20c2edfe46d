mod greet;
mod messages;
mod pubsub;

pub use greet::*;
pub use messages::*;
pub use pubsub::*;

use actix_web::{HttpResponse, Responder};

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok()
}
