//! 服务层请求/响应对象

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    CertificateType, CourseModule, CourseSettings, DifficultyLevel, EnrollmentSettings,
};

/// 创建课程请求
///
/// 标题、组织、讲师为必填，其余字段缺省时由目录填入文档化默认值。
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    #[validate(length(min = 1, message = "课程标题不能为空"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "组织 ID 不能为空"))]
    pub organization_id: String,
    #[validate(length(min = 1, message = "讲师 ID 不能为空"))]
    pub instructor_id: String,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty_level: Option<DifficultyLevel>,
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub certificate_type: Option<CertificateType>,
    #[serde(default)]
    pub enrollment_settings: Option<EnrollmentSettings>,
    #[serde(default)]
    pub settings: Option<CourseSettings>,
}

impl NewCourse {
    /// 最小可用的创建请求，其余字段走默认值
    pub fn basic(
        title: impl Into<String>,
        organization_id: impl Into<String>,
        instructor_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            organization_id: organization_id.into(),
            instructor_id: instructor_id.into(),
            instructor_name: None,
            category: None,
            tags: Vec::new(),
            difficulty_level: None,
            estimated_duration: None,
            prerequisites: Vec::new(),
            certificate_type: None,
            enrollment_settings: None,
            settings: None,
        }
    }
}

/// 更新课程请求
///
/// 仅携带的字段会被合并进现有记录，统计数据不在可更新范围内。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub difficulty_level: Option<DifficultyLevel>,
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub prerequisites: Option<Vec<String>>,
    #[serde(default)]
    pub certificate_type: Option<CertificateType>,
    #[serde(default)]
    pub enrollment_settings: Option<EnrollmentSettings>,
    #[serde(default)]
    pub modules: Option<Vec<CourseModule>>,
    #[serde(default)]
    pub settings: Option<CourseSettings>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// 学生选课记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub send_invitation: bool,
}

impl StudentRecord {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            department_id: None,
            send_invitation: false,
        }
    }

    /// 邮箱、名、姓是否全部非空
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty()
            && !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
    }
}

/// 选课请求
///
/// 按策略区分的一次性请求对象，构造后即被消费，不可变更。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum EnrollmentRequest {
    /// 手动添加单个学生
    Manual {
        course_id: String,
        student: StudentRecord,
    },
    /// 批量添加（行已由花名册解析器校验）
    Bulk {
        course_id: String,
        students: Vec<StudentRecord>,
        #[serde(default)]
        department_id: Option<String>,
    },
    /// 部门整体自动选课
    DepartmentAuto {
        course_id: String,
        department_id: String,
    },
    /// 邀请码兑换
    InvitationRedeem {
        code: String,
        student: StudentRecord,
    },
}

/// 选课结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentOutcome {
    pub success: u32,
    pub failed: u32,
}

impl EnrollmentOutcome {
    pub fn new(success: u32, failed: u32) -> Self {
        Self { success, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_new_course_requires_title_org_instructor() {
        assert!(NewCourse::basic("Rust 入门", "org-1", "instructor-1")
            .validate()
            .is_ok());

        assert!(NewCourse::basic("", "org-1", "instructor-1").validate().is_err());
        assert!(NewCourse::basic("Rust 入门", "", "instructor-1").validate().is_err());
        assert!(NewCourse::basic("Rust 入门", "org-1", "").validate().is_err());
    }

    #[test]
    fn test_student_record_completeness() {
        assert!(StudentRecord::new("a@x.com", "Ada", "Lovelace").is_complete());
        assert!(!StudentRecord::new("", "Ada", "Lovelace").is_complete());
        assert!(!StudentRecord::new("a@x.com", "  ", "Lovelace").is_complete());
    }

    #[test]
    fn test_enrollment_request_serde_tag() {
        let request = EnrollmentRequest::InvitationRedeem {
            code: "ABCD2345".to_string(),
            student: StudentRecord::new("a@x.com", "Ada", "Lovelace"),
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["method"], "INVITATION_REDEEM");
        assert_eq!(json["code"], "ABCD2345");
    }

    #[test]
    fn test_enrollment_outcome_serde() {
        let outcome = EnrollmentOutcome::new(5, 0);
        let json = serde_json::to_value(outcome).unwrap();
        assert_eq!(json["success"], 5);
        assert_eq!(json["failed"], 0);
    }
}
