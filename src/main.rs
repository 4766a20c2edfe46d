use std::net::TcpListener;

use actix_web::web;
use anyhow::Context;
use hello_pubsub::{domain::MessageLog, telemetry};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // 遥测初始化
    let subscriber = telemetry::get_subscriber("hello_pubsub", "info", std::io::stdout);
    telemetry::init_subscriber(subscriber);
    tracing::info!("starting server...");

    let config = hello_pubsub::config::config().context("failed to read configuration.")?;
    let address = config.web.server_address();
    let listener = TcpListener::bind(&address)
        .with_context(|| format!("failed to bind web port {address}."))?;
    tracing::info!("listening on {address}");

    let message_log = web::Data::new(MessageLog::new());
    hello_pubsub::run(listener, &config, message_log)?.await?;

    Ok(())
}
