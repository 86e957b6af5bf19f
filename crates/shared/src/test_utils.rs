//! 测试工具模块
//!
//! 提供测试所需的辅助函数、确定性实现和测试数据生成器。
//! 用于简化测试代码编写，提高测试的可重复性和可维护性。

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::EnrollmentConfig;
use crate::ident::IdentifierGenerator;
use crate::store::MemoryStore;

/// 确定性标识符生成器
///
/// 实体 ID 按计数器递增；邀请码按预置序列依次弹出，
/// 序列耗尽后回退到计数器生成。预置重复的邀请码即可
/// 验证冲突重试逻辑，无需依赖随机碰撞。
pub struct SequenceIdentifierGenerator {
    counter: AtomicU64,
    codes: Mutex<VecDeque<String>>,
}

impl SequenceIdentifierGenerator {
    pub fn new() -> Self {
        Self::with_codes(Vec::<String>::new())
    }

    /// 预置邀请码序列
    pub fn with_codes(codes: Vec<impl Into<String>>) -> Self {
        Self {
            counter: AtomicU64::new(0),
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }
}

impl Default for SequenceIdentifierGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierGenerator for SequenceIdentifierGenerator {
    fn entity_id(&self) -> String {
        format!("id-{:04}", self.counter.fetch_add(1, Ordering::Relaxed))
    }

    fn invitation_code(&self) -> String {
        self.codes.lock().pop_front().unwrap_or_else(|| {
            format!("CODE{:04}", self.counter.fetch_add(1, Ordering::Relaxed))
        })
    }
}

/// 创建测试用内存存储
pub fn test_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// 创建测试用选课配置
///
/// 可通过 ttl_seconds 控制邀请码过期行为：
/// 传入 0 或负值使新建邀请立即过期。
pub fn test_enrollment_config(ttl_seconds: i64) -> EnrollmentConfig {
    EnrollmentConfig {
        invitation_ttl_seconds: ttl_seconds,
        code_length: 8,
        max_code_attempts: 3,
        department_roster_min: 5,
        department_roster_max: 25,
    }
}

/// 生成唯一的测试课程 ID
pub fn test_course_id() -> String {
    format!("test-course-{}", Uuid::new_v4())
}

/// 生成唯一的测试学生邮箱
pub fn test_student_email() -> String {
    format!("student-{}@example.com", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_generator_pops_preset_codes() {
        let generator = SequenceIdentifierGenerator::with_codes(vec!["AAAA", "BBBB"]);

        assert_eq!(generator.invitation_code(), "AAAA");
        assert_eq!(generator.invitation_code(), "BBBB");
        // 序列耗尽后回退到计数器生成
        assert!(generator.invitation_code().starts_with("CODE"));
    }

    #[test]
    fn test_sequence_generator_entity_ids_increment() {
        let generator = SequenceIdentifierGenerator::new();
        assert_eq!(generator.entity_id(), "id-0000");
        assert_eq!(generator.entity_id(), "id-0001");
    }

    #[test]
    fn test_test_ids_are_unique() {
        assert_ne!(test_course_id(), test_course_id());
        assert_ne!(test_student_email(), test_student_email());
    }
}
