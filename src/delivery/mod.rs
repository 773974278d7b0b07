//! 推送投递核心 - 在消费者缺席、在后台或尚未就绪时协调推送消息的投递
//!
//! # 组成
//! 1. `normalizer`：原始键值包 → `NormalizedEvent`
//! 2. `reachability`：消费者是否挂载、是否在前台
//! 3. `cache`：最多一条的待投递缓存
//! 4. `dispatcher`：立即投递 / 渲染并缓存 / 仅缓存，消费者就绪时排空
//! 5. `registration`：注册 id 生命周期
//!
//! # 使用示例
//! ```ignore
//! use push_bridge::delivery::{BridgeState, DeliveryDispatcher, RawEvent};
//!
//! let dispatcher = DeliveryDispatcher::new(state, bridge, transport, renderer, config);
//! dispatcher.handle_incoming(&RawEvent::new().with("message", "hi"));
//! dispatcher.attach_consumer("onNotification");
//! dispatcher.on_consumer_ready()?;
//! ```

pub mod adapters;
pub mod cache;
pub mod collaborator;
pub mod dispatcher;
pub mod event;
pub mod hints;
pub mod normalizer;
pub mod offline_store;
pub mod plugin;
pub mod reachability;
pub mod registration;
pub mod state;

pub use cache::PendingCache;
pub use collaborator::{Deliverable, NotificationRenderer, PushTransport, Supportedness};
pub use dispatcher::{DeliveryDispatcher, DeliveryOutcome, DrainOutcome};
pub use event::{EventKind, NormalizedEvent, RawEvent};
pub use hints::NotificationHints;
pub use normalizer::normalize;
pub use offline_store::{FileOfflineStore, MemoryOfflineStore, OfflineMessageStore};
pub use plugin::PushPlugin;
pub use reachability::{ReachabilityState, ReachabilityTracker};
pub use registration::{PendingAction, RegistrationMachine, RegistrationRecord, RegistrationState};
pub use state::BridgeState;
