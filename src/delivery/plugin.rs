//! 插件命令入口 - `register` / `unregister` 以及宿主的生命周期回调

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::dispatcher::DeliveryDispatcher;
use super::reachability::is_usable_callback;
use crate::error::{BridgeError, BridgeResult};

pub const ACTION_REGISTER: &str = "register";
pub const ACTION_UNREGISTER: &str = "unregister";
pub const ECB: &str = "ecb";

pub const REGISTRATION_STARTED: &str = "Registration started...";
pub const UNREGISTRATION_STARTED: &str = "Unregistration started...";

/// 推送插件
pub struct PushPlugin {
    dispatcher: Arc<DeliveryDispatcher>,
}

impl PushPlugin {
    pub fn new(dispatcher: Arc<DeliveryDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<DeliveryDispatcher> {
        &self.dispatcher
    }

    /// 执行消费者发来的命令
    ///
    /// `register` 需要 `{"ecb": "<回调名>"}`，成功后挂载消费者并走就绪流程。
    pub fn execute(&self, action: &str, options: Option<&Value>) -> BridgeResult<&'static str> {
        self.dispatcher.ensure_supported()?;

        let result = match action {
            ACTION_REGISTER => self.register(options),
            ACTION_UNREGISTER => self
                .dispatcher
                .unregister()
                .map(|_| UNREGISTRATION_STARTED),
            other => Err(BridgeError::InvalidAction(other.to_string())),
        };

        if let Err(e) = &result {
            error!(action = %action, error = %e, "Plugin action rejected");
        }
        result
    }

    fn register(&self, options: Option<&Value>) -> BridgeResult<&'static str> {
        let options = options
            .filter(|o| !o.is_null())
            .ok_or(BridgeError::RegisterOptionsMissing)?;

        let callback = options
            .get(ECB)
            .filter(|v| !v.is_null())
            .ok_or(BridgeError::CallbackNotSpecified)?;
        let callback = callback.as_str().unwrap_or_default();
        if !is_usable_callback(callback) {
            return Err(BridgeError::CallbackNameEmpty);
        }

        info!(callback = %callback, "Register requested");
        self.dispatcher.attach_consumer(callback);
        self.dispatcher.on_consumer_ready()?;
        Ok(REGISTRATION_STARTED)
    }

    /// 宿主进入后台
    pub fn on_pause(&self) {
        debug!("onPause");
        self.dispatcher.set_foreground(false);
    }

    /// 宿主回到前台
    pub fn on_resume(&self) {
        debug!("onResume");
        self.dispatcher.set_foreground(true);
    }

    /// 宿主销毁
    pub fn on_destroy(&self) {
        debug!("onDestroy");
        self.dispatcher.detach_consumer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::delivery::adapters::{RecordingBridge, ScriptedTransport, TracingRenderer};
    use crate::delivery::collaborator::Supportedness;
    use crate::delivery::event::RawEvent;
    use crate::delivery::offline_store::MemoryOfflineStore;
    use crate::delivery::state::BridgeState;
    use serde_json::json;

    fn plugin_with(transport: ScriptedTransport) -> (PushPlugin, Arc<RecordingBridge>, Arc<ScriptedTransport>) {
        let bridge = Arc::new(RecordingBridge::new());
        let transport = Arc::new(transport);
        let dispatcher = DeliveryDispatcher::new(
            Arc::new(BridgeState::new()),
            bridge.clone(),
            transport.clone(),
            Arc::new(TracingRenderer::new(Arc::new(MemoryOfflineStore::new()))),
            BridgeConfig::default(),
        );
        (PushPlugin::new(Arc::new(dispatcher)), bridge, transport)
    }

    #[test]
    fn test_register_validates_options() {
        let (plugin, _, _) = plugin_with(ScriptedTransport::new());

        assert_eq!(plugin.execute("register", None), Err(BridgeError::RegisterOptionsMissing));
        assert_eq!(
            plugin.execute("register", Some(&Value::Null)),
            Err(BridgeError::RegisterOptionsMissing)
        );
        assert_eq!(
            plugin.execute("register", Some(&json!({}))),
            Err(BridgeError::CallbackNotSpecified)
        );
        assert_eq!(
            plugin.execute("register", Some(&json!({"ecb": ""}))),
            Err(BridgeError::CallbackNameEmpty)
        );
    }

    #[test]
    fn test_blank_callback_rejected_before_attach() {
        let (plugin, bridge, _) = plugin_with(ScriptedTransport::new());
        let dispatcher = plugin.dispatcher();
        dispatcher.handle_incoming(&RawEvent::new().with("message", "hold"));

        assert_eq!(
            plugin.execute("register", Some(&json!({"ecb": "  "}))),
            Err(BridgeError::CallbackNameEmpty)
        );
        assert!(bridge.deliveries().is_empty());
        assert!(!dispatcher.state().reachability.is_attached());
        assert!(dispatcher.state().cache.is_pending());
    }

    #[test]
    fn test_warm_start_tap_delivered_once() {
        let offline = Arc::new(MemoryOfflineStore::new());
        let renderer = Arc::new(TracingRenderer::new(offline));
        let bridge = Arc::new(RecordingBridge::new());
        let dispatcher = DeliveryDispatcher::new(
            Arc::new(BridgeState::new()),
            bridge.clone(),
            Arc::new(ScriptedTransport::new()),
            renderer.clone(),
            BridgeConfig::default(),
        );
        let plugin = PushPlugin::new(Arc::new(dispatcher));

        plugin.dispatcher().handle_incoming(&RawEvent::new().with("message", "ping"));
        assert!(renderer.tap(true).unwrap());
        plugin.execute("register", Some(&json!({"ecb": "cb"}))).unwrap();
        plugin.execute("register", Some(&json!({"ecb": "cb"}))).unwrap();

        let pings: Vec<_> = bridge
            .deliveries()
            .into_iter()
            .filter(|d| d.payload["payload"]["message"] == "ping")
            .collect();
        assert_eq!(pings.len(), 1);
    }

    #[test]
    fn test_register_emits_known_id() {
        let transport = ScriptedTransport::new();
        transport.issue_id("abc123");
        let (plugin, bridge, transport) = plugin_with(transport);

        let response = plugin.execute("register", Some(&json!({"ecb": "onNotification"}))).unwrap();
        assert_eq!(response, REGISTRATION_STARTED);
        assert_eq!(transport.register_requests(), 0);

        let deliveries = bridge.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].to_string(), r#"onNotification({"event":"register","regid":"abc123"})"#);
    }

    #[test]
    fn test_unregister_and_invalid_action() {
        let (plugin, _, transport) = plugin_with(ScriptedTransport::new());
        assert_eq!(plugin.execute("unregister", None), Ok(UNREGISTRATION_STARTED));
        assert_eq!(transport.unregister_requests(), 1);

        assert_eq!(
            plugin.execute("ping", None),
            Err(BridgeError::InvalidAction("ping".to_string()))
        );
    }

    #[test]
    fn test_unsupported_rejects_everything() {
        let (plugin, _, _) = plugin_with(ScriptedTransport::with_support(Supportedness::UnsupportedTransport));
        let expected = Err(BridgeError::UnsupportedPlatform(Supportedness::UnsupportedTransport));
        assert_eq!(plugin.execute("register", Some(&json!({"ecb": "cb"}))), expected);
        assert_eq!(plugin.execute("unregister", None), expected);
        assert_eq!(plugin.execute("ping", None), expected);
    }

    #[test]
    fn test_lifecycle_callbacks() {
        let (plugin, _, _) = plugin_with(ScriptedTransport::new());
        plugin.execute("register", Some(&json!({"ecb": "cb"}))).unwrap();

        let state = plugin.dispatcher().state();
        plugin.on_resume();
        assert!(state.reachability.is_foreground());
        plugin.on_pause();
        assert!(!state.reachability.is_foreground());
        plugin.on_resume();
        plugin.on_destroy();
        assert!(!state.reachability.is_attached());
        assert!(!state.reachability.is_foreground());
    }
}
