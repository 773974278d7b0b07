//! 系统通知提示 - 从原始推送数据中提取标题、正文、声音、图标等

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::event::{RawEvent, MESSAGE};
use crate::config::BridgeConfig;

/// 渲染器使用的提示信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationHints {
    pub title: Option<String>,
    /// 通知正文（可能是配置的默认文本）
    pub message: Option<String>,
    /// 声音资源名
    pub sound: Option<String>,
    pub icon: Option<String>,
    /// 角标数字（msgcnt）
    pub badge: Option<u32>,
    pub notification_id: i32,
}

impl NotificationHints {
    pub fn from_raw(raw: &RawEvent, config: &BridgeConfig) -> Self {
        let message = raw.get_str(MESSAGE).filter(|m| !m.is_empty());
        let message = match message {
            Some(text) if config.show_message_in_notification => Some(text.to_string()),
            _ => config.default_notification_message.clone(),
        };

        let sound = raw
            .get_str("gcm.notification.sound")
            .or_else(|| raw.get_str("sound"))
            .map(sound_resource_name);

        let badge = int_field(raw, "msgcnt").and_then(|n| u32::try_from(n).ok());

        let notification_id = match raw.get("notId") {
            None => config.default_notification_id,
            Some(_) => match int_field(raw, "notId").and_then(|n| i32::try_from(n).ok()) {
                Some(id) => id,
                None => {
                    debug!("Invalid notId, using default notification id");
                    config.default_notification_id
                }
            },
        };

        Self {
            title: raw.get_str("title").map(str::to_string),
            message,
            sound,
            icon: raw.get_str("icon").map(str::to_string),
            badge,
            notification_id,
        }
    }

    /// 有可展示的正文才渲染系统通知
    pub fn is_displayable(&self) -> bool {
        self.message.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// 整数字段，接受 JSON 数字或数字字符串
fn int_field(raw: &RawEvent, key: &str) -> Option<i64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `www/sounds/woopwoop.caf` → `woopwoop`（取第三段路径的文件名主干），其他原样返回
fn sound_resource_name(sound: &str) -> String {
    if sound.starts_with("www/sounds") {
        if let Some(file) = sound.split('/').nth(2) {
            return file.split('.').next().unwrap_or(file).to_string();
        }
    }
    sound.to_string()
}
