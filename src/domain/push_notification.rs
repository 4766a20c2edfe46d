use std::{collections::BTreeMap, fmt::Display};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_aux::field_attributes::deserialize_default_from_null;
use uuid::Uuid;

/// Pub/Sub推送请求的消息体
/// 字段缺失或为`null`时使用默认值
#[derive(serde::Deserialize, Debug, Default)]
pub struct PushRequest {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub message: PubsubMessage,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub subscription: String,
}

#[derive(serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PubsubMessage {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub attributes: BTreeMap<String, String>,
    /// base64编码的消息内容，原样保存
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub publish_time: Option<String>,
}

/// 已接收的推送通知，写入消息记录后不再修改
#[derive(Debug, Clone)]
pub struct PushNotification {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    pub subscription: String,
    pub attributes: BTreeMap<String, String>,
    pub message_id: Option<String>,
    pub publish_time: Option<String>,
}

impl PushNotification {
    pub const NOTIFICATION_TYPE: &'static str = "notificationType";
    pub const RESOURCE_NAME: &'static str = "resourceName";

    pub fn receive(request: PushRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at: Utc::now(),
            subscription: request.subscription,
            attributes: request.message.attributes,
            message_id: request.message.message_id,
            publish_time: request.message.publish_time,
        }
    }

    /// 属性不存在时返回空字符串
    pub fn attribute(&self, key: &str) -> &str {
        self.attributes.get(key).map(String::as_str).unwrap_or_default()
    }

    pub fn notification_type(&self) -> &str {
        self.attribute(Self::NOTIFICATION_TYPE)
    }

    pub fn resource_name(&self) -> &str {
        self.attribute(Self::RESOURCE_NAME)
    }

    pub fn received_at_rfc3339(&self) -> String {
        self.received_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

impl Display for PushNotification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id={} received_at={} subscription={:?}",
            self.id,
            self.received_at_rfc3339(),
            self.subscription
        )?;
        if let Some(message_id) = &self.message_id {
            write!(f, " message_id={message_id:?}")?;
        }
        if let Some(publish_time) = &self.publish_time {
            write!(f, " publish_time={publish_time:?}")?;
        }
        write!(f, " attributes={:?}", self.attributes)
    }
}
