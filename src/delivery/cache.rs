//! 待投递缓存 - 最多保存一条事件，新事件覆盖旧事件（不是队列）

use parking_lot::Mutex;
use tracing::debug;

use super::event::NormalizedEvent;

/// 单槽缓存
#[derive(Debug, Default)]
pub struct PendingCache {
    slot: Mutex<Option<NormalizedEvent>>,
}

impl PendingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存事件，覆盖已有事件
    pub fn store(&self, event: NormalizedEvent) {
        let replaced = self.slot.lock().replace(event);
        if replaced.is_some() {
            debug!("Pending event overwritten by a newer one");
        }
    }

    /// 原子地取出缓存的事件
    pub fn take_if_present(&self) -> Option<NormalizedEvent> {
        self.slot.lock().take()
    }

    /// 仅在槽位为空时放回事件，返回是否放回
    ///
    /// 用于投递失败后归还，不会覆盖期间并发写入的更新事件。
    pub fn restore(&self, event: NormalizedEvent) -> bool {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            debug!("Newer event cached meanwhile, dropping the restored one");
            return false;
        }
        *slot = Some(event);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::event::RawEvent;
    use crate::delivery::normalizer::normalize;
    use std::sync::Arc;
    use std::thread;

    fn message(text: &str) -> NormalizedEvent {
        normalize(&RawEvent::new().with("message", text))
    }

    #[test]
    fn test_store_then_take() {
        let cache = PendingCache::new();
        cache.store(message("hi"));
        assert!(cache.is_pending());
        assert_eq!(cache.take_if_present(), Some(message("hi")));
        assert!(!cache.is_pending());
    }

    #[test]
    fn test_last_write_wins() {
        let cache = PendingCache::new();
        cache.store(message("e1"));
        cache.store(message("e2"));

        assert_eq!(cache.take_if_present(), Some(message("e2")));
        assert_eq!(cache.take_if_present(), None);
    }

    #[test]
    fn test_restore_only_into_empty_slot() {
        let cache = PendingCache::new();
        assert!(cache.restore(message("old")));

        let taken = cache.take_if_present().unwrap();
        cache.store(message("new"));
        assert!(!cache.restore(taken));
        assert_eq!(cache.take_if_present(), Some(message("new")));
    }

    #[test]
    fn test_concurrent_store_keeps_single_entry() {
        let cache = Arc::new(PendingCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || cache.store(message(&format!("m{}", i))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let survivor = cache.take_if_present().unwrap();
        let text = survivor.payload().unwrap()["message"].as_str().unwrap().to_string();
        assert!(text.starts_with('m'));
        assert!(cache.take_if_present().is_none());
    }
}
