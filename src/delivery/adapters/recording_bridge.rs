//! 记录型 bridge - 把每次投递记在内存里，可切换为离线以模拟 bridge 调用失败

use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

use crate::delivery::collaborator::Deliverable;

/// 一次投递
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub callback: String,
    pub payload: Value,
}

impl fmt::Display for Delivery {
    /// `callback({...})`，即消费者侧看到的调用
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.callback, self.payload)
    }
}

pub struct RecordingBridge {
    deliveries: Mutex<Vec<Delivery>>,
    online: AtomicBool,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self {
            deliveries: Mutex::new(Vec::new()),
            online: AtomicBool::new(true),
        }
    }

    /// 设为离线后所有投递都返回 false
    pub fn set_online(&self, online: bool) {
        debug!(online, "Bridge availability changed");
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// 全部投递记录
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }

    /// 取走目前为止的投递记录
    pub fn take_deliveries(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.deliveries.lock())
    }
}

impl Default for RecordingBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Deliverable for RecordingBridge {
    fn deliver(&self, callback: &str, payload: &Value) -> bool {
        if !self.is_online() {
            return false;
        }

        let delivery = Delivery {
            callback: callback.to_string(),
            payload: payload.clone(),
        };
        trace!(call = %delivery, "Delivering to consumer");
        self.deliveries.lock().push(delivery);
        true
    }
}
