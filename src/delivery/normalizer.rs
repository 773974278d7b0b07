//! Payload 规范化 - 把原始推送键值包转换为 `NormalizedEvent`
//!
//! 规则：
//! 1. `foreground` / `coldstart` 解释为布尔值，提升到顶层，不进入 payload
//! 2. `message` 原样进入 payload
//! 3. 以 `{` / `[` 开头的字符串尝试解析为对象/数组，失败则保留原字符串
//! 4. 其他值原样保留
//!
//! 规范化永远不会失败。

use serde_json::{Map, Value};
use tracing::debug;

use super::event::{EventKind, NormalizedEvent, RawEvent, COLDSTART, EVENT, FOREGROUND, MESSAGE, PAYLOAD};

/// 规范化原始事件
pub fn normalize(raw: &RawEvent) -> NormalizedEvent {
    let mut fields = Map::new();
    fields.insert(EVENT.to_string(), Value::String(MESSAGE.to_string()));

    let mut payload = Map::new();
    for (key, value) in raw.iter() {
        match key.as_str() {
            FOREGROUND | COLDSTART => {
                fields.insert(key.clone(), Value::Bool(as_flag(value)));
            }
            MESSAGE => {
                payload.insert(key.clone(), value.clone());
            }
            _ => {
                payload.insert(key.clone(), expand_value(key, value));
            }
        }
    }

    fields.insert(PAYLOAD.to_string(), Value::Object(payload));
    NormalizedEvent::new(EventKind::Message, fields)
}

/// 系统字段的布尔解释
fn as_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

/// 尝试展开看起来像 JSON 的字符串
fn expand_value(key: &str, value: &Value) -> Value {
    let Value::String(text) = value else {
        return value.clone();
    };

    if text.starts_with('{') {
        match serde_json::from_str::<Map<String, Value>>(text) {
            Ok(object) => return Value::Object(object),
            Err(e) => debug!(key = %key, error = %e, "Value looks like an object but failed to parse, keeping string"),
        }
    } else if text.starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(text) {
            Ok(array) => return Value::Array(array),
            Err(e) => debug!(key = %key, error = %e, "Value looks like an array but failed to parse, keeping string"),
        }
    }

    value.clone()
}
