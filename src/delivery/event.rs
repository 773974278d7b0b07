//! 事件结构
//!
//! `RawEvent` 是推送通道交来的原始键值包，`NormalizedEvent` 是交给消费者的规范化事件。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EVENT: &str = "event";
pub const PAYLOAD: &str = "payload";
pub const MESSAGE: &str = "message";
pub const FOREGROUND: &str = "foreground";
pub const COLDSTART: &str = "coldstart";
pub const REG_ID: &str = "regid";
pub const REGISTER: &str = "register";
pub const UNREGISTER: &str = "unregister";
pub const ERROR: &str = "error";

/// 原始推送数据（保持键的插入顺序）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawEvent(Map<String, Value>);

impl RawEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式插入
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 仅当值为字符串时返回
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for RawEvent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// 事件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// 推送消息
    Message,
    /// 注册 id 变化（register / unregister / error）
    RegistrationChange,
}

/// 规范化后的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub kind: EventKind,
    pub fields: Map<String, Value>,
}

impl NormalizedEvent {
    pub fn new(kind: EventKind, fields: Map<String, Value>) -> Self {
        Self { kind, fields }
    }

    /// `{event: "register", regid}`
    pub fn registered(registration_id: impl Into<String>) -> Self {
        Self::registration(REGISTER, registration_id.into())
    }

    /// `{event: "unregister", regid}`
    pub fn unregistered(registration_id: impl Into<String>) -> Self {
        Self::registration(UNREGISTER, registration_id.into())
    }

    /// `{event: "error", msg}`
    pub fn registration_error(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(EVENT.to_string(), Value::String(ERROR.to_string()));
        fields.insert("msg".to_string(), Value::String(message.into()));
        Self::new(EventKind::RegistrationChange, fields)
    }

    fn registration(event: &str, registration_id: String) -> Self {
        let mut fields = Map::new();
        fields.insert(EVENT.to_string(), Value::String(event.to_string()));
        fields.insert(REG_ID.to_string(), Value::String(registration_id));
        Self::new(EventKind::RegistrationChange, fields)
    }

    /// 事件名（`event` 字段）
    pub fn event_name(&self) -> Option<&str> {
        self.fields.get(EVENT).and_then(Value::as_str)
    }

    /// 消息事件的 payload
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.fields.get(PAYLOAD).and_then(Value::as_object)
    }

    pub fn foreground(&self) -> Option<bool> {
        self.fields.get(FOREGROUND).and_then(Value::as_bool)
    }

    pub fn coldstart(&self) -> Option<bool> {
        self.fields.get(COLDSTART).and_then(Value::as_bool)
    }

    /// 交给消费者的 JSON 参数
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// 还原为扁平的原始数据（payload 展开，系统字段保留），再次规范化结果不变
    pub fn to_raw(&self) -> RawEvent {
        let mut raw = RawEvent::new();
        for key in [FOREGROUND, COLDSTART] {
            if let Some(value) = self.fields.get(key) {
                raw.insert(key, value.clone());
            }
        }
        if let Some(payload) = self.payload() {
            for (key, value) in payload {
                raw.insert(key.clone(), value.clone());
            }
        }
        raw
    }
}
