//! 服务间抽象接口定义
//!
//! 定义分发器对课程目录的依赖接口，便于依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Course, CourseStatsDelta};

/// 课程统计写入接口
///
/// 统计变更原语的抽象：所有选课策略最终都收敛到这一个调用上。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentSink: Send + Sync {
    /// 对指定课程原子地应用一个统计增量
    async fn apply_enrollment(&self, course_id: &str, delta: CourseStatsDelta) -> Result<Course>;
}
