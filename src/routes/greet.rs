use actix_web::{web, HttpResponse};

use crate::{config::GreetingConfig, util::plain_text};

#[derive(serde::Deserialize, Default, Debug)]
pub struct GreetingBody {
    #[serde(default)]
    name: Option<String>,
}

/// 生成问候语，`name`为空时使用默认名称
pub fn greeting(name: Option<&str>, default_name: &str) -> String {
    let name = name.filter(|n| !n.is_empty()).unwrap_or(default_name);
    format!("Hello {name}!\n")
}

/// 空请求体和`null`都视为`{}`
fn decode_body(body: &[u8]) -> Result<GreetingBody, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GreetingBody::default());
    }
    let body: Option<GreetingBody> = serde_json::from_slice(body)?;
    Ok(body.unwrap_or_default())
}

#[tracing::instrument(name = "greet", skip(body, greeting_config))]
pub async fn greet(body: web::Bytes, greeting_config: web::Data<GreetingConfig>) -> HttpResponse {
    let body = match decode_body(&body) {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("greeting body failed to decode. {e}");
            return plain_text("message failed to decode!!\r\n");
        }
    };

    plain_text(greeting(body.name.as_deref(), &greeting_config.default_name))
}
