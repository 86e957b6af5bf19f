//! 持久化 key/value 存储模块
//!
//! 邀请记录的持久化镜像只要求 get/set/delete 级别的 key/value 能力，
//! 不绑定任何具体存储引擎。业务逻辑依赖 `DurableStore` trait：
//! 测试注入 `MemoryStore`，生产环境使用 `FileStore`，
//! 使未兑换的邀请码在进程重启后依然有效。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::Result;

/// 持久化存储能力
///
/// 值为序列化后的 JSON 字符串，序列化格式由调用方决定。
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// 获取值
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 设置值（写穿，调用返回即已持久化）
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// 删除值，键不存在时静默成功
    async fn delete(&self, key: &str) -> Result<()>;

    /// 按前缀列出所有键
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// 刷写尚未落盘的数据
    async fn flush(&self) -> Result<()>;
}

/// 内存存储
///
/// 不跨进程存活，用于测试和演示场景。
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// 文件存储
///
/// 单个 JSON 文件保存整个 key/value 表，每次变更先写临时文件再原子替换，
/// 避免进程中途崩溃留下半写状态。写入全程持有互斥锁，
/// 并发变更按到达顺序串行落盘。
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// 打开（或新建）文件存储，加载已有内容
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), "file store opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");

        tokio::fs::write(&tmp, serialized).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), entries = entries.len(), "file store persisted");
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn flush(&self) -> Result<()> {
        let entries = self.entries.lock().await;
        self.persist(&entries).await
    }
}
