//! 课程级串行化锁
//!
//! 进程内 per-key 异步锁表：同一课程的统计变更必须串行执行，
//! 不同课程互不阻塞。引擎按约定单进程运行，无需分布式锁后端。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// 课程锁表
///
/// 每个课程 ID 懒初始化一把异步互斥锁。锁条目创建后不回收——
/// 课程数量与目录规模同阶，常驻开销可忽略。
#[derive(Default)]
pub struct CourseLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl CourseLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指定课程的锁，持有者 drop 守卫即释放
    pub async fn acquire(&self, course_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(course_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        lock.lock_owned().await
    }
}
