//! 错误类型
//!
//! 只有配置类错误和平台不支持会穿过系统边界，其余情况（payload 解析失败、
//! handoff 失败）都在内部被缓存/降级策略吸收。

use thiserror::Error;

use crate::delivery::collaborator::Supportedness;

/// 对外暴露的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// 回调标识缺失或为空等配置问题
    #[error("configuration error: {0}")]
    Configuration(String),
    /// 设备或推送通道不支持
    #[error("push is not supported: {0}")]
    UnsupportedPlatform(Supportedness),
    /// register 未提供参数
    #[error("Register options are not specified.")]
    RegisterOptionsMissing,
    /// register 参数中没有 ecb
    #[error("ecb(eventcallback) option is not specified in register().")]
    CallbackNotSpecified,
    /// ecb 为空字符串
    #[error("ecb(eventcallback) value is missing in options for register().")]
    CallbackNameEmpty,
    /// 未知 action
    #[error("Invalid action : {0}")]
    InvalidAction(String),
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
