//! 外部协作方 trait 定义
//!
//! 推送通道（注册/注销）、系统通知渲染、到消费者的 bridge 都在这里以 trait 表达，
//! 分发器只依赖这些接口。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::event::{NormalizedEvent, RawEvent};
use super::hints::NotificationHints;

/// 推送能力检测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Supportedness {
    /// 支持
    Supported,
    /// 设备不支持推送
    UnsupportedDevice,
    /// 设备支持但推送通道不可用
    UnsupportedTransport,
}

impl Supportedness {
    pub fn is_supported(self) -> bool {
        self == Supportedness::Supported
    }
}

impl fmt::Display for Supportedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Supportedness::Supported => "supported",
            Supportedness::UnsupportedDevice => "push notifications are not supported on this device",
            Supportedness::UnsupportedTransport => "the push transport is not supported on this device",
        };
        f.write_str(text)
    }
}

/// 推送通道（注册 id 的来源）
///
/// `register_device` / `unregister_device` 是异步动作，结果通过分发器的
/// `on_registered` / `on_unregistered` / `on_registration_error` 回调确认。
pub trait PushTransport: Send + Sync {
    /// 发起注册
    fn register_device(&self);

    /// 发起注销
    fn unregister_device(&self);

    /// 通道记住的最近一次注册 id
    fn current_registration_id(&self) -> Option<String>;

    /// 推送能力
    fn is_registration_supported(&self) -> Supportedness;
}

/// 系统通知渲染器
pub trait NotificationRenderer: Send + Sync {
    /// 在通知中心展示一条通知
    fn render_system_notification(&self, event: &NormalizedEvent, hints: &NotificationHints);

    /// 清除本应用的系统通知
    fn clear_system_notification(&self);

    /// 取出（并清除）从通知启动时留下的离线消息
    fn take_last_offline_message(&self) -> Option<RawEvent>;
}

/// 到消费者的投递能力
pub trait Deliverable: Send + Sync {
    /// 以 `callback(payload)` 的形式调用消费者，返回是否到达了存活的消费者
    fn deliver(&self, callback: &str, payload: &Value) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supportedness() {
        assert!(Supportedness::Supported.is_supported());
        assert!(!Supportedness::UnsupportedDevice.is_supported());
        assert!(!Supportedness::UnsupportedTransport.is_supported());
    }

    #[test]
    fn test_supportedness_serde() {
        let json = serde_json::to_string(&Supportedness::UnsupportedTransport).unwrap();
        assert_eq!(json, "\"unsupported_transport\"");
    }
}
