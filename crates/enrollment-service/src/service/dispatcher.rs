//! 选课分发器
//!
//! 单一入口编排四种选课策略，全部收敛到课程目录的统计变更原语上。
//! 分发器本身不持有任何跨调用状态。
//!
//! ## 策略语义
//!
//! - **Manual**: 校验学生三元组非空，应用一个选课单位
//! - **Bulk**: 行已由花名册解析器过滤，每行无条件计为成功，
//!   整批人数通过一次统计变更原子应用（不是逐行调用）
//! - **DepartmentAuto**: 从部门目录取得非负人数，一次性原子应用
//! - **InvitationRedeem**: 先由注册表完成兑换迁移，再应用一个选课单位

use std::sync::Arc;

use tracing::{info, instrument};

use crate::directory::DepartmentDirectory;
use crate::error::{EnrollError, Result};
use crate::models::CourseStatsDelta;
use crate::service::dto::{EnrollmentOutcome, EnrollmentRequest, StudentRecord};
use crate::service::registry::InvitationRegistry;
use crate::service::traits::EnrollmentSink;

/// 选课分发器
pub struct EnrollmentDispatcher {
    sink: Arc<dyn EnrollmentSink>,
    registry: Arc<InvitationRegistry>,
    directory: Arc<dyn DepartmentDirectory>,
}

impl EnrollmentDispatcher {
    pub fn new(
        sink: Arc<dyn EnrollmentSink>,
        registry: Arc<InvitationRegistry>,
        directory: Arc<dyn DepartmentDirectory>,
    ) -> Self {
        Self {
            sink,
            registry,
            directory,
        }
    }

    /// 执行一次选课请求
    #[instrument(skip(self, request), fields(actor = %actor))]
    pub async fn enroll(
        &self,
        actor: &str,
        request: EnrollmentRequest,
    ) -> Result<EnrollmentOutcome> {
        match request {
            EnrollmentRequest::Manual { course_id, student } => {
                self.enroll_manual(&course_id, &student).await
            }
            EnrollmentRequest::Bulk {
                course_id,
                students,
                ..
            } => self.enroll_bulk(&course_id, &students).await,
            EnrollmentRequest::DepartmentAuto {
                course_id,
                department_id,
            } => self.enroll_department(&course_id, &department_id).await,
            EnrollmentRequest::InvitationRedeem { code, student } => {
                self.enroll_by_invitation(&code, &student).await
            }
        }
    }

    async fn enroll_manual(
        &self,
        course_id: &str,
        student: &StudentRecord,
    ) -> Result<EnrollmentOutcome> {
        if !student.is_complete() {
            return Err(EnrollError::Validation(
                "学生邮箱、名、姓均不能为空".to_string(),
            ));
        }

        self.sink
            .apply_enrollment(course_id, CourseStatsDelta::enrolled(1))
            .await?;

        info!(course_id = %course_id, student = %student.email, "手动选课成功");
        Ok(EnrollmentOutcome::new(1, 0))
    }

    async fn enroll_bulk(
        &self,
        course_id: &str,
        students: &[StudentRecord],
    ) -> Result<EnrollmentOutcome> {
        // 行校验是解析器的职责，这里每行无条件计为成功
        let count = students.len() as u32;
        if count == 0 {
            return Ok(EnrollmentOutcome::new(0, 0));
        }

        // 整批一次原子应用，课程变更对整个批次保持原子
        self.sink
            .apply_enrollment(course_id, CourseStatsDelta::enrolled(count as i64))
            .await?;

        info!(course_id = %course_id, count, "批量选课成功");
        Ok(EnrollmentOutcome::new(count, 0))
    }

    async fn enroll_department(
        &self,
        course_id: &str,
        department_id: &str,
    ) -> Result<EnrollmentOutcome> {
        if department_id.trim().is_empty() {
            return Err(EnrollError::Validation("部门 ID 不能为空".to_string()));
        }

        let count = self.directory.roster_size(department_id).await?;
        if count == 0 {
            return Ok(EnrollmentOutcome::new(0, 0));
        }

        self.sink
            .apply_enrollment(course_id, CourseStatsDelta::enrolled(count as i64))
            .await?;

        info!(course_id = %course_id, department_id = %department_id, count, "部门选课成功");
        Ok(EnrollmentOutcome::new(count, 0))
    }

    async fn enroll_by_invitation(
        &self,
        code: &str,
        student: &StudentRecord,
    ) -> Result<EnrollmentOutcome> {
        if !student.is_complete() {
            return Err(EnrollError::Validation(
                "学生邮箱、名、姓均不能为空".to_string(),
            ));
        }

        // 注册表只负责记录迁移与镜像删除，选课单位由这里统一应用，
        // 一次兑换恰好产生一次统计变更
        let record = self.registry.redeem(code, student).await?;
        self.sink
            .apply_enrollment(&record.course_id, CourseStatsDelta::enrolled(1))
            .await?;

        info!(
            course_id = %record.course_id,
            code = %code,
            student = %student.email,
            "邀请码选课成功"
        );
        Ok(EnrollmentOutcome::new(1, 0))
    }
}
