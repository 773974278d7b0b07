//! 消费者可达性追踪 - 记录是否有存活的消费者以及它是否在前台

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// 回调标识去掉空白后非空才能用于投递
pub fn is_usable_callback(callback: &str) -> bool {
    !callback.trim().is_empty()
}

/// 可达性快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReachabilityState {
    /// 消费者注册的事件回调标识
    pub consumer: Option<String>,
    /// 是否在前台
    pub foregrounded: bool,
}

impl ReachabilityState {
    pub fn consumer_attached(&self) -> bool {
        self.consumer.is_some()
    }
}

/// 可达性追踪器
///
/// 整条记录由一把锁保护，任何时刻都满足：未挂载 ⇒ 不在前台。
#[derive(Debug, Default)]
pub struct ReachabilityTracker {
    state: Mutex<ReachabilityState>,
}

impl ReachabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 挂载消费者（替换之前的回调，不改变前台标记）
    pub fn attach(&self, callback: impl Into<String>) {
        let callback = callback.into();
        let mut state = self.state.lock();
        debug!(callback = %callback, previous = ?state.consumer, "Consumer attached");
        state.consumer = Some(callback);
    }

    /// 卸载消费者，同时强制退到后台
    pub fn detach(&self) {
        let mut state = self.state.lock();
        if state.consumer.is_some() {
            debug!("Consumer detached");
        }
        state.consumer = None;
        state.foregrounded = false;
    }

    /// 设置前台状态；未挂载时忽略进入前台
    pub fn set_foreground(&self, foreground: bool) {
        let mut state = self.state.lock();
        if foreground && state.consumer.is_none() {
            debug!("Ignoring foreground transition without an attached consumer");
            return;
        }
        state.foregrounded = foreground;
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().consumer.is_some()
    }

    pub fn is_foreground(&self) -> bool {
        self.state.lock().foregrounded
    }

    /// 当前回调标识
    pub fn callback(&self) -> Option<String> {
        self.state.lock().consumer.clone()
    }

    pub fn snapshot(&self) -> ReachabilityState {
        self.state.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_callback() {
        assert!(is_usable_callback("onNotification"));
        assert!(!is_usable_callback(""));
        assert!(!is_usable_callback(" \t "));
    }

    #[test]
    fn test_attach_and_foreground() {
        let tracker = ReachabilityTracker::new();
        assert!(!tracker.is_attached());

        tracker.attach("cb");
        assert!(tracker.is_attached());
        assert!(!tracker.is_foreground());

        tracker.set_foreground(true);
        assert!(tracker.is_foreground());
        assert_eq!(tracker.callback(), Some("cb".to_string()));
    }

    #[test]
    fn test_attach_replaces_callback() {
        let tracker = ReachabilityTracker::new();
        tracker.attach("first");
        tracker.set_foreground(true);
        tracker.attach("second");

        assert_eq!(tracker.callback(), Some("second".to_string()));
        // 重新挂载不影响前台状态
        assert!(tracker.is_foreground());
    }

    #[test]
    fn test_detach_forces_background() {
        let tracker = ReachabilityTracker::new();
        tracker.attach("cb");
        tracker.set_foreground(true);
        tracker.detach();

        assert_eq!(tracker.snapshot(), ReachabilityState::default());
    }

    #[test]
    fn test_detach_is_idempotent() {
        let tracker = ReachabilityTracker::new();
        tracker.attach("cb");
        tracker.detach();
        let once = tracker.snapshot();
        tracker.detach();
        assert_eq!(tracker.snapshot(), once);
    }

    #[test]
    fn test_foreground_ignored_when_detached() {
        let tracker = ReachabilityTracker::new();
        tracker.set_foreground(true);
        assert!(!tracker.is_foreground());
        assert!(!tracker.snapshot().consumer_attached());
    }
}
