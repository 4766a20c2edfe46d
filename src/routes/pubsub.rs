use std::fmt::Debug;

use actix_web::{
    http::{header::ContentType, StatusCode},
    web, HttpResponse, ResponseError,
};

use crate::{
    case_client::CaseClientFactory,
    domain::{MessageLog, PushNotification, PushRequest},
    util::{error_chain_fmt, escape_html, plain_text},
};

#[tracing::instrument(
    name = "receive push notification",
    skip_all,
    fields(
        notification_id = tracing::field::Empty,
        subscription = tracing::field::Empty,
    )
)]
pub async fn receive_push(
    body: web::Bytes,
    message_log: web::Data<MessageLog>,
    case_clients: web::Data<CaseClientFactory>,
) -> Result<HttpResponse, PushError> {
    let request: PushRequest = serde_json::from_slice(&body).map_err(PushError::DecodeError)?;
    let notification = PushNotification::receive(request);
    let span = tracing::Span::current();
    span.record("notification_id", tracing::field::display(&notification.id));
    span.record("subscription", tracing::field::display(&notification.subscription));

    // 在写入消息记录之前、锁之外创建客户端
    // 创建失败的通知不会被记录
    let case_client = case_clients
        .connect()
        .await
        .map_err(PushError::CaseClientError)?;

    let response = confirmation(&notification);
    message_log.append(notification);
    tracing::info!("push notification recorded.");

    if let Some(client) = case_client {
        tracing::debug!(base_url = %client.base_url(), "case client acquired.");
        client.close();
    }

    Ok(plain_text(response))
}

fn confirmation(notification: &PushNotification) -> String {
    format!(
        "Received Msg ID: {} at timestamp: {}\r\n\
        Subscription: {}\r\n\
        ResourceName: {}\r\n\
        NotificationType: {}\r\n",
        notification.id,
        notification.received_at_rfc3339(),
        escape_html(&notification.subscription),
        escape_html(notification.resource_name()),
        escape_html(notification.notification_type()),
    )
}

/// `/pubsub`只接受POST请求
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .content_type(ContentType::plaintext())
        .body("Method Not Allowed\n")
}

#[derive(thiserror::Error)]
pub enum PushError {
    #[error("PubSub message failed to decode!!")]
    DecodeError(#[source] serde_json::Error),
    #[error("Failed to create client: {0}")]
    CaseClientError(#[source] anyhow::Error),
}

impl Debug for PushError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for PushError {
    fn status_code(&self) -> StatusCode {
        match self {
            PushError::DecodeError(_) => StatusCode::BAD_REQUEST,
            PushError::CaseClientError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(format!("{self}\r\n"))
    }
}
