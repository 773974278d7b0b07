//! 投递分发器 - 决定每条推送是立即投递、渲染并缓存，还是仅缓存
//!
//! 推送回调路径（`handle_incoming`、注册确认）和 UI 生命周期路径
//! （`attach_consumer`、`on_consumer_ready` 等）可以在不同线程并发调用，
//! 共享状态全部在 `BridgeState` 中。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::collaborator::{Deliverable, NotificationRenderer, PushTransport, Supportedness};
use super::event::{NormalizedEvent, RawEvent};
use super::hints::NotificationHints;
use super::normalizer::normalize;
use super::reachability::is_usable_callback;
use super::state::BridgeState;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};

/// `handle_incoming` 的结果（仅用于诊断，两种情况都视为投递完成）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 已交给消费者
    Delivered,
    /// 已缓存，`notified` 表示是否渲染了系统通知
    Cached { notified: bool },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// 缓存排空的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// 没有待投递的消息
    Empty,
    /// 投递了缓存中的消息
    DeliveredCached,
    /// 投递了从通知启动时留下的离线消息
    DeliveredOffline,
    /// 投递失败，消息留在缓存中
    Retained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handoff {
    Delivered,
    NoConsumer,
    Rejected,
}

/// 投递分发器
pub struct DeliveryDispatcher {
    state: Arc<BridgeState>,
    bridge: Arc<dyn Deliverable>,
    transport: Arc<dyn PushTransport>,
    renderer: Arc<dyn NotificationRenderer>,
    config: BridgeConfig,
    support: Supportedness,
    /// 自上次就绪以来已投递过缓存消息；此时离线消息对应同一条通知
    cached_delivered: AtomicBool,
}

impl DeliveryDispatcher {
    /// 创建分发器，推送能力只在这里检测一次
    pub fn new(
        state: Arc<BridgeState>,
        bridge: Arc<dyn Deliverable>,
        transport: Arc<dyn PushTransport>,
        renderer: Arc<dyn NotificationRenderer>,
        config: BridgeConfig,
    ) -> Self {
        let support = transport.is_registration_supported();
        if support.is_supported() {
            info!("Push transport ready");
        } else {
            error!(support = %support, "Push transport unavailable, plugin calls will be rejected");
        }

        Self {
            state,
            bridge,
            transport,
            renderer,
            config,
            support,
            cached_delivered: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> &Arc<BridgeState> {
        &self.state
    }

    /// 平台不支持时所有对外调用都短路到同一个错误
    pub fn ensure_supported(&self) -> BridgeResult<()> {
        if self.support.is_supported() {
            Ok(())
        } else {
            Err(BridgeError::UnsupportedPlatform(self.support))
        }
    }

    // ------------------------------------------------------------------
    // 推送通道路径
    // ------------------------------------------------------------------

    /// 处理一条到达的推送
    pub fn handle_incoming(&self, raw: &RawEvent) -> DeliveryOutcome {
        let event = normalize(raw);

        let handoff = self.handoff(&event);
        if handoff == Handoff::Delivered {
            debug!("Message delivered to consumer");
            return DeliveryOutcome::Delivered;
        }

        let foreground = self.state.reachability.is_foreground();
        info!(reason = ?handoff, foreground, "Consumer unreachable, caching message");
        self.state.cache.store(event.clone());

        let notified = if foreground {
            // 用户正在看应用，不弹系统通知
            debug!("Consumer in foreground, suppressing system notification");
            false
        } else {
            let hints = NotificationHints::from_raw(raw, &self.config);
            if hints.is_displayable() {
                self.renderer.render_system_notification(&event, &hints);
                true
            } else {
                debug!("No message text, skipping system notification");
                false
            }
        };

        // 失败后消费者恰好挂载上来时，挂载侧的排空可能已经错过了这条消息
        if handoff == Handoff::NoConsumer && self.state.reachability.is_attached() {
            self.drain_pending();
        }

        DeliveryOutcome::Cached { notified }
    }

    /// 推送通道确认注册成功
    pub fn on_registered(&self, registration_id: &str) {
        self.state.registration.on_registered(registration_id);
        self.emit(NormalizedEvent::registered(registration_id));
    }

    /// 推送通道报告注册失败
    pub fn on_registration_error(&self, error_id: &str) {
        self.state.registration.on_registration_error(error_id);
        self.emit(NormalizedEvent::registration_error(error_id));
    }

    /// 推送通道确认注销
    pub fn on_unregistered(&self) {
        if let Some(previous) = self.state.registration.on_unregistered() {
            self.emit(NormalizedEvent::unregistered(previous));
        }
    }

    // ------------------------------------------------------------------
    // UI 生命周期路径
    // ------------------------------------------------------------------

    /// 消费者挂载，随即尝试投递缓存的消息
    pub fn attach_consumer(&self, callback: &str) {
        self.state.reachability.attach(callback);
        self.drain_pending();
    }

    pub fn detach_consumer(&self) {
        self.state.reachability.detach();
    }

    /// 前后台切换，回到前台时尝试投递缓存的消息
    pub fn set_foreground(&self, foreground: bool) {
        self.state.reachability.set_foreground(foreground);
        if foreground && self.state.reachability.is_attached() {
            self.drain_pending();
        }
    }

    /// 消费者注册好事件回调后调用
    pub fn on_consumer_ready(&self) -> BridgeResult<()> {
        self.ensure_supported()?;

        let callback = self
            .state
            .reachability
            .callback()
            .filter(|cb| is_usable_callback(cb))
            .ok_or_else(|| {
                BridgeError::Configuration("no event callback registered by the consumer".to_string())
            })?;
        info!(callback = %callback, "Consumer ready");

        match self.transport.current_registration_id().filter(|id| !id.is_empty()) {
            Some(id) => {
                debug!(regid = %id, "Registration id already known");
                self.state.registration.adopt(id.as_str());
                self.emit(NormalizedEvent::registered(id));
            }
            None => {
                self.state.registration.begin_register();
                self.transport.register_device();
            }
        }

        let outcome = self.drain();
        debug!(?outcome, "Drain finished");
        Ok(())
    }

    /// 消费者请求注销
    pub fn unregister(&self) -> BridgeResult<()> {
        self.ensure_supported()?;
        self.state.registration.begin_unregister();
        self.transport.unregister_device();
        Ok(())
    }

    /// 排空：先投递缓存的消息，没有则投递离线消息
    ///
    /// 每个就绪周期只投递二者之一。缓存消息投递过（本次或在挂载、回到前台时）
    /// 的话，点击通知留下的离线消息就是同一条，直接丢弃。
    pub fn drain(&self) -> DrainOutcome {
        let outcome = self.drain_pending();
        if outcome == DrainOutcome::Retained {
            return outcome;
        }
        let cached_delivered = self.cached_delivered.swap(false, Ordering::SeqCst);

        let Some(raw) = self.renderer.take_last_offline_message() else {
            return outcome;
        };
        if cached_delivered {
            debug!("Offline message already delivered from cache, discarding");
            return outcome;
        }

        // 离线消息已从渲染器中取出，失败时必须转入缓存
        let event = normalize(&raw);
        if self.handoff(&event) == Handoff::Delivered {
            info!("Offline message delivered");
            self.renderer.clear_system_notification();
            DrainOutcome::DeliveredOffline
        } else {
            warn!("Offline message could not be delivered, caching it");
            self.state.cache.restore(event);
            DrainOutcome::Retained
        }
    }

    /// 只排空待投递缓存
    fn drain_pending(&self) -> DrainOutcome {
        let Some(event) = self.state.cache.take_if_present() else {
            return DrainOutcome::Empty;
        };

        if self.handoff(&event) == Handoff::Delivered {
            info!("Cached message delivered");
            self.cached_delivered.store(true, Ordering::SeqCst);
            self.renderer.clear_system_notification();
            DrainOutcome::DeliveredCached
        } else {
            warn!("Cached message could not be delivered, keeping it");
            self.state.cache.restore(event);
            DrainOutcome::Retained
        }
    }

    /// 调用消费者的回调
    fn handoff(&self, event: &NormalizedEvent) -> Handoff {
        let Some(callback) = self.state.reachability.callback().filter(|cb| is_usable_callback(cb)) else {
            return Handoff::NoConsumer;
        };

        if self.bridge.deliver(&callback, &event.to_json()) {
            Handoff::Delivered
        } else {
            Handoff::Rejected
        }
    }

    /// 注册类事件不缓存，消费者不可达时直接丢弃
    fn emit(&self, event: NormalizedEvent) -> bool {
        let delivered = self.handoff(&event) == Handoff::Delivered;
        if !delivered {
            debug!(
                event = ?event.event_name(),
                "Consumer unreachable, registration event dropped (re-read at next ready)"
            );
        }
        delivered
    }
}
