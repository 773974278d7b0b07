//! 注册状态机 - 追踪注册 id 的生命周期
//!
//! ```text
//! Unregistered → Registering → Registered → Unregistering → Unregistered
//! ```
//!
//! 状态由 `RegistrationRecord` 推导，迁移由推送通道的确认回调驱动。

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

/// 进行中的动作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    #[default]
    None,
    Registering,
    Unregistering,
}

/// 注册记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationRecord {
    pub id: Option<String>,
    pub pending_action: PendingAction,
}

/// 注册状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Unregistered,
    Registering,
    Registered,
    Unregistering,
}

impl RegistrationRecord {
    pub fn state(&self) -> RegistrationState {
        match (self.pending_action, &self.id) {
            (PendingAction::Registering, _) => RegistrationState::Registering,
            (PendingAction::Unregistering, _) => RegistrationState::Unregistering,
            (PendingAction::None, Some(_)) => RegistrationState::Registered,
            (PendingAction::None, None) => RegistrationState::Unregistered,
        }
    }
}

/// 注册状态机
#[derive(Debug, Default)]
pub struct RegistrationMachine {
    record: Mutex<RegistrationRecord>,
}

impl RegistrationMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RegistrationState {
        self.record.lock().state()
    }

    pub fn registration_id(&self) -> Option<String> {
        self.record.lock().id.clone()
    }

    pub fn snapshot(&self) -> RegistrationRecord {
        self.record.lock().clone()
    }

    /// 进入 Registering，返回是否是新发起的注册
    pub fn begin_register(&self) -> bool {
        let mut record = self.record.lock();
        if record.pending_action == PendingAction::Registering {
            debug!("Registration already in flight, re-triggering");
            return false;
        }
        debug!(from = ?record.state(), "Registration started");
        record.pending_action = PendingAction::Registering;
        true
    }

    /// 推送通道确认注册成功
    pub fn on_registered(&self, id: impl Into<String>) {
        let id = id.into();
        let mut record = self.record.lock();
        if record.pending_action != PendingAction::Registering {
            // 通道侧的 id 刷新也会走到这里
            debug!(state = ?record.state(), "Registration confirmed without a pending request");
        }
        info!(regid = %id, "Registered with push transport");
        record.id = Some(id);
        record.pending_action = PendingAction::None;
    }

    /// 注册失败，回到上一个稳定状态
    pub fn on_registration_error(&self, error: &str) -> RegistrationState {
        let mut record = self.record.lock();
        warn!(error = %error, state = ?record.state(), "Registration failed");
        record.pending_action = PendingAction::None;
        record.state()
    }

    /// 进入 Unregistering
    pub fn begin_unregister(&self) {
        let mut record = self.record.lock();
        debug!(from = ?record.state(), "Unregistration started");
        record.pending_action = PendingAction::Unregistering;
    }

    /// 推送通道确认注销，返回被清除的 id
    pub fn on_unregistered(&self) -> Option<String> {
        let mut record = self.record.lock();
        let previous = record.id.take();
        record.pending_action = PendingAction::None;
        info!(regid = ?previous, "Unregistered from push transport");
        previous
    }

    /// 采用推送通道已记住的 id（不视为一次迁移）
    pub fn adopt(&self, id: impl Into<String>) {
        let mut record = self.record.lock();
        record.id = Some(id.into());
        if record.pending_action == PendingAction::Registering {
            record.pending_action = PendingAction::None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let machine = RegistrationMachine::new();
        assert_eq!(machine.state(), RegistrationState::Unregistered);

        assert!(machine.begin_register());
        assert_eq!(machine.state(), RegistrationState::Registering);

        machine.on_registered("xyz");
        assert_eq!(machine.state(), RegistrationState::Registered);
        assert_eq!(machine.registration_id(), Some("xyz".to_string()));

        machine.begin_unregister();
        assert_eq!(machine.state(), RegistrationState::Unregistering);

        assert_eq!(machine.on_unregistered(), Some("xyz".to_string()));
        assert_eq!(machine.state(), RegistrationState::Unregistered);
        assert_eq!(machine.snapshot(), RegistrationRecord::default());
    }

    #[test]
    fn test_begin_register_twice() {
        let machine = RegistrationMachine::new();
        assert!(machine.begin_register());
        assert!(!machine.begin_register());
        assert_eq!(machine.state(), RegistrationState::Registering);
    }

    #[test]
    fn test_error_returns_to_stable_state() {
        let machine = RegistrationMachine::new();
        machine.begin_register();
        assert_eq!(machine.on_registration_error("TIMEOUT"), RegistrationState::Unregistered);

        machine.on_registered("abc");
        machine.begin_register();
        assert_eq!(machine.on_registration_error("TIMEOUT"), RegistrationState::Registered);
        assert_eq!(machine.registration_id(), Some("abc".to_string()));
    }

    #[test]
    fn test_unsolicited_registration_accepted() {
        let machine = RegistrationMachine::new();
        machine.on_registered("renewed");
        assert_eq!(machine.state(), RegistrationState::Registered);
    }

    #[test]
    fn test_adopt_clears_pending_register() {
        let machine = RegistrationMachine::new();
        machine.begin_register();
        machine.adopt("abc123");
        assert_eq!(machine.state(), RegistrationState::Registered);
    }
}
