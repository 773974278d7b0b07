//! 协作方的参考实现，供模拟器和测试驱动分发器

pub mod recording_bridge;
pub mod scripted_transport;
pub mod tracing_renderer;

pub use recording_bridge::{Delivery, RecordingBridge};
pub use scripted_transport::ScriptedTransport;
pub use tracing_renderer::{DisplayedNotification, TracingRenderer};
