//! 共享状态 - 进程内唯一的可达性、待投递缓存和注册记录
//!
//! 通过 `Arc<BridgeState>` 同时交给推送回调路径和 UI 生命周期路径。

use super::cache::PendingCache;
use super::reachability::ReachabilityTracker;
use super::registration::RegistrationMachine;

#[derive(Debug, Default)]
pub struct BridgeState {
    pub reachability: ReachabilityTracker,
    pub cache: PendingCache,
    pub registration: RegistrationMachine,
}

impl BridgeState {
    pub fn new() -> Self {
        Self::default()
    }
}
