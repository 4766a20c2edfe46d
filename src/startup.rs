use std::net::TcpListener;

use actix_web::{dev::Server, middleware::from_fn, web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::{
    authentication::{verify_push_token, VerificationToken},
    case_client::CaseClientFactory,
    config::Config,
    domain::MessageLog,
    routes::{
        clear_messages, greet, health_check, list_push_messages, method_not_allowed, receive_push,
    },
};

/// 启动web服务
/// `message_log`由调用方持有，测试中可以直接检查消息记录
pub fn run(
    listener: TcpListener,
    config: &Config,
    message_log: web::Data<MessageLog>,
) -> Result<Server, anyhow::Error> {
    let greeting = web::Data::new(config.greeting.clone());
    let case_clients = web::Data::new(CaseClientFactory::from_config(&config.case_client));
    let verification_token = verification_token(config)?.map(web::Data::new);
    if !case_clients.is_enabled() {
        tracing::info!("case api base url not configured, case client disabled.");
    }

    let server = HttpServer::new(move || {
        // 令牌只校验POST请求，其他方法仍然返回405
        let mut pubsub = web::resource("/pubsub")
            .route(
                web::post()
                    .to(receive_push)
                    .wrap(from_fn(verify_push_token)),
            )
            .default_service(web::to(method_not_allowed));
        if let Some(token) = &verification_token {
            pubsub = pubsub.app_data(token.clone());
        }

        App::new()
            .wrap(TracingLogger::default())
            .app_data(message_log.clone())
            .app_data(greeting.clone())
            .app_data(case_clients.clone())
            .service(
                web::resource("/")
                    .route(web::get().to(greet))
                    .route(web::post().to(greet)),
            )
            .route("/health_check", web::get().to(health_check))
            .service(pubsub)
            .route("/listPushMessages", web::route().to(list_push_messages))
            .route("/clear", web::post().to(clear_messages))
    })
    .listen(listener)
    .context("failed to listen on web port.")?
    .run();

    Ok(server)
}

fn verification_token(config: &Config) -> Result<Option<VerificationToken>, anyhow::Error> {
    if !config.pubsub.enforce_verification_token {
        return Ok(None);
    }

    let token = config
        .pubsub
        .verification_token
        .clone()
        .context("verification token enforcement is enabled but PUBSUB_VERIFICATION_TOKEN is unset.")?;
    tracing::info!("push verification token enforced.");

    Ok(Some(VerificationToken::new(token)))
}
