//! 标识符生成模块
//!
//! 生成实体 ID 与人工输入的邀请码。随机源作为注入能力抽象，
//! 便于测试提供确定性序列来验证冲突处理和唯一性逻辑。

use rand::Rng;
use uuid::Uuid;

/// 邀请码字符集：大写字母 + 数字，去掉易混淆的 I/O/0/1
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 标识符生成能力
pub trait IdentifierGenerator: Send + Sync {
    /// 生成全局唯一的不透明实体 ID
    fn entity_id(&self) -> String;

    /// 生成人工输入的邀请码
    ///
    /// 仅保证单次调用的随机性，不保证全局唯一——
    /// 唯一性校验由调用方（邀请注册表）负责。
    fn invitation_code(&self) -> String;
}

/// 随机标识符生成器
///
/// 实体 ID 使用 UUID v4，邀请码从 `CODE_CHARSET` 均匀采样。
#[derive(Debug, Clone)]
pub struct RandomIdentifierGenerator {
    code_length: usize,
}

impl RandomIdentifierGenerator {
    pub fn new(code_length: usize) -> Self {
        Self { code_length }
    }
}

impl Default for RandomIdentifierGenerator {
    fn default() -> Self {
        Self { code_length: 8 }
    }
}

impl IdentifierGenerator for RandomIdentifierGenerator {
    fn entity_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn invitation_code(&self) -> String {
        let mut rng = rand::rng();
        (0..self.code_length)
            .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_unique() {
        let generator = RandomIdentifierGenerator::default();
        assert_ne!(generator.entity_id(), generator.entity_id());
    }

    #[test]
    fn test_invitation_code_length_and_charset() {
        let generator = RandomIdentifierGenerator::new(8);
        let code = generator.invitation_code();

        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
    }

    #[test]
    fn test_invitation_code_respects_configured_length() {
        let generator = RandomIdentifierGenerator::new(12);
        assert_eq!(generator.invitation_code().len(), 12);
    }
}
