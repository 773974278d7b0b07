// src/cli/simulate.rs
//! Simulate 命令 - 回放 JSONL 脚本驱动投递核心
//!
//! 每行一个步骤，例如：
//! ```text
//! {"step": "incoming", "data": {"message": "hi", "foreground": "false"}}
//! {"step": "register", "options": {"ecb": "cb"}}
//! {"step": "registered", "id": "xyz"}
//! ```
//! 消费者收到的每次调用以 `=> callback({...})` 打印到 stdout。

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::delivery::adapters::{RecordingBridge, ScriptedTransport, TracingRenderer};
use crate::delivery::offline_store::{FileOfflineStore, OfflineMessageStore};
use crate::delivery::{BridgeState, DeliveryDispatcher, DeliveryOutcome, PushPlugin, RawEvent};

/// Simulate 命令参数
#[derive(Args)]
pub struct SimulateArgs {
    /// JSONL 脚本路径
    pub script: PathBuf,

    /// 配置文件路径（默认 ~/.config/push-bridge/config.json）
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 离线消息文件路径（覆盖配置）
    #[arg(long)]
    pub offline_store: Option<PathBuf>,
}

/// 脚本步骤
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    /// 消费者挂载
    Attach { callback: String },
    /// 消费者卸载
    Detach,
    /// 前后台切换
    Foreground { value: bool },
    /// 消费者调用 register 命令
    Register {
        #[serde(default)]
        options: Option<Value>,
    },
    /// 消费者调用 unregister 命令
    Unregister,
    /// 消费者就绪（回调已挂载）
    Ready,
    /// 推送到达
    Incoming { data: RawEvent },
    /// 推送通道确认注册
    Registered { id: String },
    /// 推送通道报告注册失败
    RegistrationError { error: String },
    /// 推送通道确认注销
    Unregistered,
    /// bridge 可用性
    Bridge { online: bool },
    /// 用户点击系统通知
    Tap,
    /// 进程重启（内存状态丢失）
    Restart,
}

/// 模拟器：一组参考协作方加上投递核心
pub struct Simulator {
    config: BridgeConfig,
    bridge: Arc<RecordingBridge>,
    transport: Arc<ScriptedTransport>,
    renderer: Arc<TracingRenderer>,
    plugin: PushPlugin,
}

impl Simulator {
    pub fn new(config: BridgeConfig, offline: Arc<dyn OfflineMessageStore>) -> Self {
        let bridge = Arc::new(RecordingBridge::new());
        let transport = Arc::new(ScriptedTransport::new());
        let renderer = Arc::new(TracingRenderer::new(offline));
        let plugin = Self::boot(&config, &bridge, &transport, &renderer);

        Self {
            config,
            bridge,
            transport,
            renderer,
            plugin,
        }
    }

    fn boot(
        config: &BridgeConfig,
        bridge: &Arc<RecordingBridge>,
        transport: &Arc<ScriptedTransport>,
        renderer: &Arc<TracingRenderer>,
    ) -> PushPlugin {
        let dispatcher = DeliveryDispatcher::new(
            Arc::new(BridgeState::new()),
            bridge.clone(),
            transport.clone(),
            renderer.clone(),
            config.clone(),
        );
        PushPlugin::new(Arc::new(dispatcher))
    }

    pub fn plugin(&self) -> &PushPlugin {
        &self.plugin
    }

    pub fn renderer(&self) -> &TracingRenderer {
        &self.renderer
    }

    pub fn transport(&self) -> &ScriptedTransport {
        &self.transport
    }

    /// 执行一步，返回输出行
    pub fn apply(&mut self, step: &ScriptStep) -> Result<Vec<String>> {
        let dispatcher = self.plugin.dispatcher().clone();
        let summary = match step {
            ScriptStep::Attach { callback } => {
                dispatcher.attach_consumer(callback);
                format!("attach {}", callback)
            }
            ScriptStep::Detach => {
                dispatcher.detach_consumer();
                "detach".to_string()
            }
            ScriptStep::Foreground { value } => {
                dispatcher.set_foreground(*value);
                format!("foreground {}", value)
            }
            ScriptStep::Register { options } => match self.plugin.execute("register", options.as_ref()) {
                Ok(response) => format!("register: {}", response),
                Err(e) => format!("register failed: {}", e),
            },
            ScriptStep::Unregister => match self.plugin.execute("unregister", None) {
                Ok(response) => format!("unregister: {}", response),
                Err(e) => format!("unregister failed: {}", e),
            },
            ScriptStep::Ready => match dispatcher.on_consumer_ready() {
                Ok(()) => "ready".to_string(),
                Err(e) => format!("ready failed: {}", e),
            },
            ScriptStep::Incoming { data } => match dispatcher.handle_incoming(data) {
                DeliveryOutcome::Delivered => "incoming: delivered".to_string(),
                DeliveryOutcome::Cached { notified: true } => "incoming: cached, notification shown".to_string(),
                DeliveryOutcome::Cached { notified: false } => "incoming: cached".to_string(),
            },
            ScriptStep::Registered { id } => {
                self.transport.issue_id(id.as_str());
                dispatcher.on_registered(id);
                format!("registered {}", id)
            }
            ScriptStep::RegistrationError { error } => {
                dispatcher.on_registration_error(error);
                format!("registration error {}", error)
            }
            ScriptStep::Unregistered => {
                self.transport.forget_id();
                dispatcher.on_unregistered();
                "unregistered".to_string()
            }
            ScriptStep::Bridge { online } => {
                self.bridge.set_online(*online);
                format!("bridge online {}", online)
            }
            ScriptStep::Tap => {
                let coldstart = !dispatcher.state().reachability.is_attached();
                if self.renderer.tap(coldstart)? {
                    "tap".to_string()
                } else {
                    "tap: no notification".to_string()
                }
            }
            ScriptStep::Restart => {
                info!("Simulated process restart");
                self.plugin = Self::boot(&self.config, &self.bridge, &self.transport, &self.renderer);
                "restart".to_string()
            }
        };

        let mut lines = vec![summary];
        lines.extend(
            self.bridge
                .take_deliveries()
                .into_iter()
                .map(|d| format!("  => {}", d)),
        );
        Ok(lines)
    }

    /// 回放脚本（空行和 `#` 开头的行忽略）
    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<Vec<String>> {
        let mut output = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let step: ScriptStep = serde_json::from_str(trimmed)
                .with_context(|| format!("Invalid step on line {}", index + 1))?;
            debug!(line = index + 1, ?step, "Applying step");
            output.extend(self.apply(&step)?);
        }
        Ok(output)
    }
}

/// 处理 simulate 命令
pub fn handle_simulate(args: SimulateArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => BridgeConfig::load_from(path)?,
        None => BridgeConfig::load()?,
    };
    let offline_path = args
        .offline_store
        .clone()
        .unwrap_or_else(|| config.offline_store_path());
    let offline = Arc::new(FileOfflineStore::new(offline_path));

    let file = File::open(&args.script)
        .with_context(|| format!("Failed to open script {}", args.script.display()))?;

    let mut simulator = Simulator::new(config, offline);
    for line in simulator.run(BufReader::new(file))? {
        println!("{}", line);
    }
    Ok(())
}
