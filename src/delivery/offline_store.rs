//! 离线消息存储 - 从系统通知启动应用时留下的那一条消息
//!
//! 与待投递缓存不同，这个槽位由渲染器写入，分发器在消费者就绪时一次性取走。
//! 文件实现是唯一能跨进程重启保留的一条消息。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::event::RawEvent;

/// 离线消息槽位
pub trait OfflineMessageStore: Send + Sync {
    /// 写入（覆盖已有消息）
    fn put(&self, raw: RawEvent) -> Result<()>;

    /// 取出并清除
    fn take(&self) -> Result<Option<RawEvent>>;
}

/// 内存实现
#[derive(Debug, Default)]
pub struct MemoryOfflineStore {
    slot: Mutex<Option<RawEvent>>,
}

impl MemoryOfflineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OfflineMessageStore for MemoryOfflineStore {
    fn put(&self, raw: RawEvent) -> Result<()> {
        *self.slot.lock() = Some(raw);
        Ok(())
    }

    fn take(&self) -> Result<Option<RawEvent>> {
        Ok(self.slot.lock().take())
    }
}

/// 文件中的记录
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OfflineRecord {
    stored_at: DateTime<Utc>,
    message: RawEvent,
}

/// 文件实现（带文件锁）
#[derive(Debug, Clone)]
pub struct FileOfflineStore {
    path: PathBuf,
}

impl FileOfflineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_locked(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.lock_exclusive()?;
        Ok(file)
    }
}

impl OfflineMessageStore for FileOfflineStore {
    fn put(&self, raw: RawEvent) -> Result<()> {
        let mut file = self.open_locked()?;
        let record = OfflineRecord {
            stored_at: Utc::now(),
            message: raw,
        };

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serde_json::to_string(&record)?.as_bytes())?;
        file.sync_all()?;
        file.unlock()?;

        debug!(path = %self.path.display(), "Offline message stored");
        Ok(())
    }

    fn take(&self) -> Result<Option<RawEvent>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = self.open_locked()?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        // 读完立即清空，保证只被消费一次
        file.set_len(0)?;
        file.sync_all()?;
        file.unlock()?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<OfflineRecord>(&content) {
            Ok(record) => {
                debug!(stored_at = %record.stored_at, "Offline message taken");
                Ok(Some(record.message))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Discarding unreadable offline message");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_take_once() {
        let store = MemoryOfflineStore::new();
        store.put(RawEvent::new().with("message", "a")).unwrap();
        store.put(RawEvent::new().with("message", "b")).unwrap();

        let taken = store.take().unwrap().unwrap();
        assert_eq!(taken.get_str("message"), Some("b"));
        assert!(store.take().unwrap().is_none());
    }

    #[test]
    fn test_file_store_take_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOfflineStore::new(dir.path().join("nested").join("offline.json"));

        assert!(store.take().unwrap().is_none());

        store.put(RawEvent::new().with("message", "hello").with("coldstart", true)).unwrap();
        let taken = store.take().unwrap().unwrap();
        assert_eq!(taken.get_str("message"), Some("hello"));
        assert!(store.take().unwrap().is_none());
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offline.json");

        FileOfflineStore::new(&path)
            .put(RawEvent::new().with("message", "persisted"))
            .unwrap();

        // 模拟进程重启
        let reopened = FileOfflineStore::new(&path);
        let taken = reopened.take().unwrap().unwrap();
        assert_eq!(taken.get_str("message"), Some("persisted"));
    }

    #[test]
    fn test_file_store_overwrites_with_shorter_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileOfflineStore::new(dir.path().join("offline.json"));
        store.put(RawEvent::new().with("message", "a much longer first message")).unwrap();
        store.put(RawEvent::new().with("message", "b")).unwrap();
        assert_eq!(store.take().unwrap().unwrap().get_str("message"), Some("b"));
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offline.json");
        fs::write(&path, "{garbage").unwrap();

        let store = FileOfflineStore::new(&path);
        assert!(store.take().unwrap().is_none());
        assert!(store.take().unwrap().is_none());
    }
}
