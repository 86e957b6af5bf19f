//! 部门目录外部协作方接口
//!
//! 部门自动选课需要知道部门的可选课学生数。花名册的真实来源
//! 属于外部目录系统，引擎只依赖"给定部门返回非负人数"这一契约。

use async_trait::async_trait;

use crate::error::Result;

/// 部门目录能力
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DepartmentDirectory: Send + Sync {
    /// 查询部门的可选课学生数
    async fn roster_size(&self, department_id: &str) -> Result<u32>;
}

/// 模拟部门目录
///
/// 没有接入真实目录系统时的缺省实现，返回区间内的随机人数。
pub struct SimulatedDirectory {
    min: u32,
    max: u32,
}

impl SimulatedDirectory {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

impl Default for SimulatedDirectory {
    fn default() -> Self {
        Self { min: 5, max: 25 }
    }
}

#[async_trait]
impl DepartmentDirectory for SimulatedDirectory {
    async fn roster_size(&self, _department_id: &str) -> Result<u32> {
        let size = {
            let mut rng = rand::rng();
            rand::Rng::random_range(&mut rng, self.min..=self.max)
        };
        Ok(size)
    }
}
