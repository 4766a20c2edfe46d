use actix_web::{web, HttpResponse, Responder};

use crate::{domain::MessageLog, util::plain_text};

#[tracing::instrument(name = "list push messages", skip_all)]
pub async fn list_push_messages(message_log: web::Data<MessageLog>) -> impl Responder {
    plain_text(message_log.render())
}

#[tracing::instrument(name = "clear push messages", skip_all)]
pub async fn clear_messages(message_log: web::Data<MessageLog>) -> impl Responder {
    message_log.clear();
    tracing::info!("push messages cleared.");
    HttpResponse::Ok()
}
