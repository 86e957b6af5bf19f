//! 课程相关实体定义
//!
//! 包含课程、课程模块、选课设置、课程统计等

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{CertificateType, DifficultyLevel, EnrollmentMethod};
use crate::error::{EnrollError, Result};

/// 课程
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    /// 课程标题
    pub title: String,
    /// 课程描述
    pub description: String,
    /// 所属组织 ID
    pub organization_id: String,
    /// 讲师 ID
    pub instructor_id: String,
    /// 讲师姓名
    pub instructor_name: String,
    /// 课程分类
    pub category: String,
    pub tags: Vec<String>,
    /// 课程难度
    pub difficulty_level: DifficultyLevel,
    /// 预计时长（分钟）
    pub estimated_duration: u32,
    /// 前置课程 ID 列表
    pub prerequisites: Vec<String>,
    /// 证书类型
    pub certificate_type: CertificateType,
    /// 选课设置
    pub enrollment_settings: EnrollmentSettings,
    /// 课程模块
    pub modules: Vec<CourseModule>,
    /// 课程设置
    pub settings: CourseSettings,
    /// 课程统计
    ///
    /// 只能通过课程目录的统计变更原语修改，其他组件不得直接写入
    pub stats: CourseStats,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 课程模块
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub id: String,
    pub title: String,
    pub description: String,
    /// 模块顺序（从 1 开始）
    pub order: u32,
}

/// 选课设置
///
/// 控制学生如何进入课程
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentSettings {
    /// 选课方式
    pub method: EnrollmentMethod,
    /// 是否开放选课
    pub is_open: bool,
    /// 是否需要审批
    pub requires_approval: bool,
    /// 最大学生数（None 表示不限）
    #[serde(default)]
    pub max_students: Option<u32>,
    /// 选课截止时间
    #[serde(default)]
    pub enrollment_deadline: Option<DateTime<Utc>>,
    /// 课程侧登记的邀请码列表
    pub invitation_codes: Vec<String>,
    /// 可访问的部门 ID 列表
    pub department_access: Vec<String>,
}

impl Default for EnrollmentSettings {
    /// 默认：手动选课，不开放，需要审批
    fn default() -> Self {
        Self {
            method: EnrollmentMethod::Manual,
            is_open: false,
            requires_approval: true,
            max_students: None,
            enrollment_deadline: None,
            invitation_codes: Vec::new(),
            department_access: Vec::new(),
        }
    }
}

/// 课程设置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSettings {
    pub allow_self_enrollment: bool,
    #[serde(default)]
    pub max_students: Option<u32>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub certificate_template: Option<String>,
}

/// 课程统计
///
/// 不变式：`enrolled_students >= completed_students >= 0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStats {
    /// 已选课学生数
    pub enrolled_students: i64,
    /// 已完成学生数
    pub completed_students: i64,
    /// 平均完成时长（分钟）
    pub average_completion_time: f64,
    /// 平均评分
    pub average_rating: f64,
    /// 评分总数
    pub total_ratings: i64,
}

impl CourseStats {
    /// 应用统计增量
    ///
    /// 先在副本上计算并校验不变式，校验通过才提交——
    /// 被拒绝的增量不会留下任何部分修改。
    pub fn apply(&mut self, delta: &CourseStatsDelta) -> Result<()> {
        let mut next = *self;

        next.enrolled_students += delta.enrolled_students;
        next.completed_students += delta.completed_students;

        if next.completed_students < 0 || next.enrolled_students < next.completed_students {
            return Err(EnrollError::Validation(format!(
                "统计增量违反不变式: enrolled={}, completed={}",
                next.enrolled_students, next.completed_students
            )));
        }

        // 完成时长并入加权平均，样本数即完成学生数
        if let Some(minutes) = delta.completion_time_minutes {
            if delta.completed_students <= 0 {
                return Err(EnrollError::Validation(
                    "提供完成时长时必须同时增加完成学生数".to_string(),
                ));
            }
            let prior = self.average_completion_time * self.completed_students as f64;
            let added = minutes * delta.completed_students as f64;
            next.average_completion_time = (prior + added) / next.completed_students as f64;
        }

        if let Some(rating) = delta.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(EnrollError::Validation(format!(
                    "评分超出范围 [0, 5]: {rating}"
                )));
            }
            next.total_ratings = self.total_ratings + 1;
            next.average_rating =
                (self.average_rating * self.total_ratings as f64 + rating) / next.total_ratings as f64;
        }

        *self = next;
        Ok(())
    }
}

/// 课程统计增量
///
/// 统计变更原语的唯一入参。各字段独立可选，
/// 未涉及的统计项保持不变。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatsDelta {
    pub enrolled_students: i64,
    pub completed_students: i64,
    /// 本批完成学生的平均完成时长（分钟）
    #[serde(default)]
    pub completion_time_minutes: Option<f64>,
    /// 单条新评分
    #[serde(default)]
    pub rating: Option<f64>,
}

impl CourseStatsDelta {
    /// 仅增加选课人数的增量
    pub fn enrolled(count: i64) -> Self {
        Self {
            enrolled_students: count,
            ..Default::default()
        }
    }
}
