//! 日志渲染器 - 用 tracing 记录系统通知，点击通知时把消息写入离线存储

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::delivery::collaborator::NotificationRenderer;
use crate::delivery::event::{NormalizedEvent, RawEvent, COLDSTART, FOREGROUND};
use crate::delivery::hints::NotificationHints;
use crate::delivery::offline_store::OfflineMessageStore;

/// 当前展示中的通知
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedNotification {
    pub event: NormalizedEvent,
    pub hints: NotificationHints,
}

pub struct TracingRenderer {
    offline: Arc<dyn OfflineMessageStore>,
    displayed: Mutex<Option<DisplayedNotification>>,
    rendered: AtomicUsize,
    cleared: AtomicUsize,
}

impl TracingRenderer {
    pub fn new(offline: Arc<dyn OfflineMessageStore>) -> Self {
        Self {
            offline,
            displayed: Mutex::new(None),
            rendered: AtomicUsize::new(0),
            cleared: AtomicUsize::new(0),
        }
    }

    pub fn displayed(&self) -> Option<DisplayedNotification> {
        self.displayed.lock().clone()
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered.load(Ordering::SeqCst)
    }

    pub fn cleared_count(&self) -> usize {
        self.cleared.load(Ordering::SeqCst)
    }

    /// 用户点击通知：通知消失，消息作为离线消息留给下次启动
    ///
    /// 返回是否有通知被点击。
    pub fn tap(&self, coldstart: bool) -> anyhow::Result<bool> {
        let Some(notification) = self.displayed.lock().take() else {
            return Ok(false);
        };

        let mut raw: RawEvent = notification.event.to_raw();
        raw.insert(FOREGROUND, false);
        raw.insert(COLDSTART, coldstart);
        self.offline.put(raw)?;

        info!(
            notification_id = notification.hints.notification_id,
            coldstart, "System notification tapped"
        );
        Ok(true)
    }
}

impl NotificationRenderer for TracingRenderer {
    fn render_system_notification(&self, event: &NormalizedEvent, hints: &NotificationHints) {
        self.rendered.fetch_add(1, Ordering::SeqCst);
        info!(
            notification_id = hints.notification_id,
            title = ?hints.title,
            message = ?hints.message,
            sound = ?hints.sound,
            icon = ?hints.icon,
            badge = ?hints.badge,
            "System notification shown"
        );
        *self.displayed.lock() = Some(DisplayedNotification {
            event: event.clone(),
            hints: hints.clone(),
        });
    }

    fn clear_system_notification(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
        if self.displayed.lock().take().is_some() {
            info!("System notification cleared");
        }
    }

    fn take_last_offline_message(&self) -> Option<RawEvent> {
        match self.offline.take() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read offline message");
                None
            }
        }
    }
}
