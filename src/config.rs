//! 配置 - `~/.config/push-bridge/config.json`
//!
//! 文件不存在时使用默认值，缺失的字段也回落到默认值。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 默认通知 ID
pub const DEFAULT_NOTIFICATION_ID: i32 = 237;

/// 推送桥配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// 是否在系统通知中展示消息正文
    pub show_message_in_notification: bool,
    /// 不展示正文或正文为空时使用的默认文本
    pub default_notification_message: Option<String>,
    /// 未指定 notId 时的通知 ID
    pub default_notification_id: i32,
    /// 离线消息文件路径（默认与配置文件同目录）
    pub offline_store_path: Option<PathBuf>,
    /// tracing 过滤器（RUST_LOG 优先）
    pub log_filter: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            show_message_in_notification: true,
            default_notification_message: None,
            default_notification_id: DEFAULT_NOTIFICATION_ID,
            offline_store_path: None,
            log_filter: None,
        }
    }
}

impl BridgeConfig {
    /// 配置目录
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("push-bridge")
    }

    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// 从默认路径加载
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// 从指定路径加载，文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// 离线消息文件路径
    pub fn offline_store_path(&self) -> PathBuf {
        self.offline_store_path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("offline_message.json"))
    }
}
