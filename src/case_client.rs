use std::time::Duration;

use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};

use crate::config::CaseClientConfig;

/// 工单服务客户端
/// 每次请求创建、使用完毕后释放
#[derive(Debug)]
pub struct CaseClient {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl CaseClient {
    /// 创建客户端并完成一次握手，确认服务可用、凭证有效
    #[tracing::instrument(name = "creating case client", skip_all, fields(base_url = %base_url))]
    async fn connect(
        base_url: &str,
        timeout: Duration,
        authorization_token: Option<&SecretString>,
    ) -> Result<Self, anyhow::Error> {
        let base_url = reqwest::Url::parse(base_url)
            .with_context(|| format!("invalid case api base url `{base_url}`."))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build case api http client.")?;

        let url = handshake_url(&base_url)?;
        let mut request = client.get(url).query(&[("pageSize", "1")]);
        if let Some(token) = authorization_token {
            request = request.bearer_auth(token.expose_secret());
        }
        request
            .send()
            .await
            .context("failed to reach case api.")?
            .error_for_status()
            .context("case api rejected the handshake.")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    pub fn close(self) {
        tracing::debug!(base_url = %self.base_url, "case client released.");
        drop(self.client);
    }
}

/// 在`base_url`原有路径之后追加`v2/cases`
fn handshake_url(base_url: &reqwest::Url) -> Result<reqwest::Url, anyhow::Error> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("case api base url `{base_url}` cannot be a base."))?
        .pop_if_empty()
        .extend(["v2", "cases"]);
    Ok(url)
}

/// 根据配置创建`CaseClient`，未配置地址时不创建
#[derive(Debug, Clone)]
pub struct CaseClientFactory {
    base_url: Option<String>,
    timeout: Duration,
    authorization_token: Option<SecretString>,
}

impl CaseClientFactory {
    pub fn from_config(config: &CaseClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            authorization_token: config.authorization_token.clone(),
        }
    }

    #[cfg(test)]
    pub fn disabled() -> Self {
        Self {
            base_url: None,
            timeout: Duration::ZERO,
            authorization_token: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    pub async fn connect(&self) -> Result<Option<CaseClient>, anyhow::Error> {
        match &self.base_url {
            None => Ok(None),
            Some(base_url) => CaseClient::connect(
                base_url,
                self.timeout,
                self.authorization_token.as_ref(),
            )
            .await
            .map(Some),
        }
    }
}
