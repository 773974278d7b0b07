//! 可编排的推送通道 - 记录注册/注销请求，注册 id 由调用方下发

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::delivery::collaborator::{PushTransport, Supportedness};

pub struct ScriptedTransport {
    registration_id: Mutex<Option<String>>,
    support: Supportedness,
    register_requests: AtomicUsize,
    unregister_requests: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::with_support(Supportedness::Supported)
    }

    pub fn with_support(support: Supportedness) -> Self {
        Self {
            registration_id: Mutex::new(None),
            support,
            register_requests: AtomicUsize::new(0),
            unregister_requests: AtomicUsize::new(0),
        }
    }

    /// 通道记住一个注册 id（对应注册成功）
    pub fn issue_id(&self, id: impl Into<String>) {
        *self.registration_id.lock() = Some(id.into());
    }

    /// 通道忘记注册 id（对应注销成功）
    pub fn forget_id(&self) {
        *self.registration_id.lock() = None;
    }

    pub fn register_requests(&self) -> usize {
        self.register_requests.load(Ordering::SeqCst)
    }

    pub fn unregister_requests(&self) -> usize {
        self.unregister_requests.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PushTransport for ScriptedTransport {
    fn register_device(&self) {
        let n = self.register_requests.fetch_add(1, Ordering::SeqCst) + 1;
        info!(requests = n, "Transport registration requested");
    }

    fn unregister_device(&self) {
        let n = self.unregister_requests.fetch_add(1, Ordering::SeqCst) + 1;
        info!(requests = n, "Transport unregistration requested");
    }

    fn current_registration_id(&self) -> Option<String> {
        self.registration_id.lock().clone()
    }

    fn is_registration_supported(&self) -> Supportedness {
        self.support
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_lifecycle() {
        let transport = ScriptedTransport::new();
        assert!(transport.current_registration_id().is_none());

        transport.register_device();
        transport.issue_id("abc");
        assert_eq!(transport.current_registration_id().as_deref(), Some("abc"));
        assert_eq!(transport.register_requests(), 1);

        transport.unregister_device();
        transport.forget_id();
        assert!(transport.current_registration_id().is_none());
        assert_eq!(transport.unregister_requests(), 1);
    }
}
