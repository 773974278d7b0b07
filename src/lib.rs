//! Push Bridge - 在消费者缺席或处于后台时协调推送消息的投递

pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use delivery::{
    normalize, BridgeState, Deliverable, DeliveryDispatcher, DeliveryOutcome, DrainOutcome, EventKind,
    NormalizedEvent, NotificationHints, NotificationRenderer, PushPlugin, PushTransport, RawEvent,
    Supportedness,
};
pub use delivery::offline_store::{FileOfflineStore, MemoryOfflineStore, OfflineMessageStore};
