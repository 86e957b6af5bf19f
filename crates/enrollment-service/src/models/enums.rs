//! 领域枚举定义

use serde::{Deserialize, Serialize};

/// 课程难度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// 证书类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateType {
    #[default]
    Completion,
    Achievement,
    Participation,
    None,
}

/// 选课方式
///
/// 学生进入课程的策略：手动添加、花名册批量上传、
/// 部门自动选课、邀请码兑换、自助选课。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentMethod {
    #[default]
    Manual,
    CsvUpload,
    DepartmentAuto,
    InvitationCode,
    SelfEnrollment,
}

/// 邀请状态
///
/// 状态迁移单向且不可逆：PENDING 之外的三个状态均为终态，
/// 任何记录都不会回到 PENDING。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Accepted,
    Expired,
    Cancelled,
}

impl InvitationStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_status_terminal() {
        assert!(!InvitationStatus::Pending.is_terminal());
        assert!(InvitationStatus::Accepted.is_terminal());
        assert!(InvitationStatus::Expired.is_terminal());
        assert!(InvitationStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_enum_serde_values() {
        assert_eq!(
            serde_json::to_value(EnrollmentMethod::CsvUpload).unwrap(),
            "CSV_UPLOAD"
        );
        assert_eq!(
            serde_json::to_value(InvitationStatus::Pending).unwrap(),
            "PENDING"
        );
        assert_eq!(
            serde_json::to_value(DifficultyLevel::Beginner).unwrap(),
            "BEGINNER"
        );
    }

    #[test]
    fn test_enum_defaults() {
        assert_eq!(EnrollmentMethod::default(), EnrollmentMethod::Manual);
        assert_eq!(CertificateType::default(), CertificateType::Completion);
        assert_eq!(InvitationStatus::default(), InvitationStatus::Pending);
    }
}
