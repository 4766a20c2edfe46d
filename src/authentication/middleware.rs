use std::fmt::Debug;

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    error::InternalError,
    http::header::ContentType,
    middleware::Next,
    web, HttpResponse,
};
use secrecy::{ExposeSecret, SecretString};

/// 推送方与本服务之间共享的校验令牌
#[derive(Clone)]
pub struct VerificationToken(SecretString);

impl VerificationToken {
    pub fn new(token: SecretString) -> Self {
        Self(token)
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0.expose_secret() == candidate
    }
}

impl Debug for VerificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerificationToken([REDACTED])")
    }
}

#[derive(serde::Deserialize)]
struct TokenQuery {
    token: String,
}

/// 校验推送请求中的`token`查询参数
/// 只有注册了`VerificationToken`时才会校验
pub async fn verify_push_token(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    if let Some(expected) = req.app_data::<web::Data<VerificationToken>>() {
        let supplied = web::Query::<TokenQuery>::from_query(req.query_string())
            .map(|q| q.into_inner().token)
            .ok();

        if !supplied.is_some_and(|token| expected.matches(&token)) {
            tracing::warn!("push request rejected, invalid verification token.");
            let e = anyhow::anyhow!("invalid verification token.");
            let res = HttpResponse::Unauthorized()
                .content_type(ContentType::plaintext())
                .body("Unauthorized\n");
            return Err(InternalError::from_response(e, res).into());
        }
    }

    next.call(req).await
}
