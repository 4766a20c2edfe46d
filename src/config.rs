use std::time::Duration;

use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_NAME: &str = "World";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Config {
    pub web: WebConfig,
    pub greeting: GreetingConfig,
    pub pubsub: PubSubConfig,
    pub case_client: CaseClientConfig,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct WebConfig {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl WebConfig {
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct GreetingConfig {
    /// 请求中没有`name`时使用的名称
    pub default_name: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct PubSubConfig {
    /// 推送方与本服务之间共享的密钥
    pub verification_token: Option<SecretString>,
    pub enforce_verification_token: bool,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct CaseClientConfig {
    /// 未配置时跳过客户端的创建
    pub base_url: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    pub authorization_token: Option<SecretString>,
}

impl CaseClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// 读取配置
/// 优先级：环境变量 > `config.yaml` > 默认值
pub fn config() -> Result<Config, config::ConfigError> {
    let port = non_empty_env("PORT");
    if port.is_none() {
        tracing::info!("defaulting to port {DEFAULT_PORT}");
    }

    config::Config::builder()
        .set_default("web.host", "0.0.0.0")?
        .set_default("web.port", i64::from(DEFAULT_PORT))?
        .set_default("greeting.default_name", DEFAULT_NAME)?
        .set_default("pubsub.enforce_verification_token", false)?
        .set_default("case_client.timeout_milliseconds", 10_000_i64)?
        .add_source(config::File::new("config.yaml", config::FileFormat::Yaml).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("web.port", port)?
        .set_override_option("greeting.default_name", non_empty_env("NAME"))?
        .set_override_option(
            "pubsub.verification_token",
            non_empty_env("PUBSUB_VERIFICATION_TOKEN"),
        )?
        .build()?
        .try_deserialize::<Config>()
}
