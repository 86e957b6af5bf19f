//! 课程目录
//!
//! 课程记录的权威内存集合，统计数据的唯一写入方。
//!
//! ## 一致性契约
//!
//! - `apply_enrollment` 是统计变更的唯一原语，按课程 ID 串行化，
//!   同一课程的并发调用观测到顺序的、无丢失的更新
//! - 快照只在变更完全结束后发布，订阅方不会看到中间状态
//! - 不同课程的变更互不阻塞，无跨课程顺序约束

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{RwLock, watch};
use tracing::{info, instrument};
use validator::Validate;

use enrollment_shared::ident::IdentifierGenerator;

use crate::error::{EnrollError, Result};
use crate::lock::CourseLocks;
use crate::models::{Course, CourseStats, CourseStatsDelta};
use crate::service::dto::{CourseUpdate, NewCourse};
use crate::service::traits::EnrollmentSink;

/// 课程目录
pub struct CourseCatalog {
    courses: RwLock<HashMap<String, Course>>,
    locks: CourseLocks,
    snapshot_tx: watch::Sender<Vec<Course>>,
    idgen: Arc<dyn IdentifierGenerator>,
}

impl CourseCatalog {
    pub fn new(idgen: Arc<dyn IdentifierGenerator>) -> Self {
        let (snapshot_tx, _) = watch::channel(Vec::new());
        Self {
            courses: RwLock::new(HashMap::new()),
            locks: CourseLocks::new(),
            snapshot_tx,
            idgen,
        }
    }

    /// 订阅课程快照
    ///
    /// 返回的 receiver 立即持有当前快照，此后每次变更推送新快照；
    /// drop receiver 即取消订阅。
    pub fn subscribe(&self) -> watch::Receiver<Vec<Course>> {
        self.snapshot_tx.subscribe()
    }

    /// 当前课程快照
    pub async fn courses(&self) -> Vec<Course> {
        let courses = self.courses.read().await;
        Self::snapshot_of(&courses)
    }

    /// 查询单个课程，不存在返回 None 而非错误
    pub async fn get(&self, id: &str) -> Option<Course> {
        self.courses.read().await.get(id).cloned()
    }

    /// 创建课程
    ///
    /// 必填字段缺失时返回校验错误；其余字段填入文档化默认值：
    /// 难度 BEGINNER、证书 COMPLETION、选课方式 MANUAL/不开放/需审批、
    /// 空模块列表、零统计。
    #[instrument(skip(self, request), fields(actor = %actor))]
    pub async fn create(&self, actor: &str, request: NewCourse) -> Result<Course> {
        request.validate()
            .map_err(|e| EnrollError::Validation(e.to_string()))?;

        // 纯空白输入视为缺失
        for (field, value) in [
            ("title", &request.title),
            ("organizationId", &request.organization_id),
            ("instructorId", &request.instructor_id),
        ] {
            if value.trim().is_empty() {
                return Err(EnrollError::Validation(format!("{field} 不能为空")));
            }
        }

        let now = Utc::now();
        let course = Course {
            id: self.idgen.entity_id(),
            title: request.title,
            description: request.description.unwrap_or_default(),
            organization_id: request.organization_id,
            instructor_id: request.instructor_id,
            instructor_name: request.instructor_name.unwrap_or_else(|| "Instructor".to_string()),
            category: request.category.unwrap_or_else(|| "General".to_string()),
            tags: request.tags,
            difficulty_level: request.difficulty_level.unwrap_or_default(),
            estimated_duration: request.estimated_duration.unwrap_or(60),
            prerequisites: request.prerequisites,
            certificate_type: request.certificate_type.unwrap_or_default(),
            enrollment_settings: request.enrollment_settings.unwrap_or_default(),
            modules: Vec::new(),
            settings: request.settings.unwrap_or_default(),
            stats: CourseStats::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut courses = self.courses.write().await;
        courses.insert(course.id.clone(), course.clone());
        self.publish(&courses);
        drop(courses);

        info!(course_id = %course.id, title = %course.title, "课程已创建");
        Ok(course)
    }

    /// 更新课程
    ///
    /// 仅合并请求中携带的字段并刷新 updated_at
    #[instrument(skip(self, update), fields(actor = %actor, course_id = %id))]
    pub async fn update(&self, actor: &str, id: &str, update: CourseUpdate) -> Result<Course> {
        let mut courses = self.courses.write().await;
        let course = courses
            .get_mut(id)
            .ok_or_else(|| EnrollError::CourseNotFound(id.to_string()))?;

        if let Some(title) = update.title {
            course.title = title;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(instructor_name) = update.instructor_name {
            course.instructor_name = instructor_name;
        }
        if let Some(category) = update.category {
            course.category = category;
        }
        if let Some(tags) = update.tags {
            course.tags = tags;
        }
        if let Some(difficulty_level) = update.difficulty_level {
            course.difficulty_level = difficulty_level;
        }
        if let Some(estimated_duration) = update.estimated_duration {
            course.estimated_duration = estimated_duration;
        }
        if let Some(prerequisites) = update.prerequisites {
            course.prerequisites = prerequisites;
        }
        if let Some(certificate_type) = update.certificate_type {
            course.certificate_type = certificate_type;
        }
        if let Some(enrollment_settings) = update.enrollment_settings {
            course.enrollment_settings = enrollment_settings;
        }
        if let Some(modules) = update.modules {
            course.modules = modules;
        }
        if let Some(settings) = update.settings {
            course.settings = settings;
        }
        if let Some(is_active) = update.is_active {
            course.is_active = is_active;
        }
        course.updated_at = Utc::now();

        let updated = course.clone();
        self.publish(&courses);
        drop(courses);

        info!(course_id = %id, "课程已更新");
        Ok(updated)
    }

    /// 删除课程，幂等：不存在的 ID 返回 false 而非错误
    #[instrument(skip(self), fields(actor = %actor, course_id = %id))]
    pub async fn delete(&self, actor: &str, id: &str) -> Result<bool> {
        let mut courses = self.courses.write().await;
        let removed = courses.remove(id).is_some();
        if removed {
            self.publish(&courses);
            info!(course_id = %id, "课程已删除");
        }
        Ok(removed)
    }

    /// 统计变更原语
    ///
    /// 同一课程的调用经课程锁串行化，读-改-写期间其他调用方等待，
    /// 保证增量不丢失；校验失败的增量不留下任何修改。
    #[instrument(skip(self, delta), fields(course_id = %id))]
    pub async fn apply_enrollment(&self, id: &str, delta: CourseStatsDelta) -> Result<Course> {
        let _guard = self.locks.acquire(id).await;

        let mut courses = self.courses.write().await;
        let course = courses
            .get_mut(id)
            .ok_or_else(|| EnrollError::CourseNotFound(id.to_string()))?;

        course.stats.apply(&delta)?;
        course.updated_at = Utc::now();

        let updated = course.clone();
        self.publish(&courses);
        drop(courses);

        info!(
            course_id = %id,
            enrolled_delta = delta.enrolled_students,
            enrolled_total = updated.stats.enrolled_students,
            "课程统计已变更"
        );
        Ok(updated)
    }

    /// 构建快照，按创建时间排序
    fn snapshot_of(courses: &HashMap<String, Course>) -> Vec<Course> {
        let mut snapshot: Vec<Course> = courses.values().cloned().collect();
        snapshot.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        snapshot
    }

    fn publish(&self, courses: &HashMap<String, Course>) {
        self.snapshot_tx.send_replace(Self::snapshot_of(courses));
    }
}

#[async_trait::async_trait]
impl EnrollmentSink for CourseCatalog {
    async fn apply_enrollment(&self, course_id: &str, delta: CourseStatsDelta) -> Result<Course> {
        CourseCatalog::apply_enrollment(self, course_id, delta).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CertificateType, DifficultyLevel, EnrollmentMethod};
    use enrollment_shared::test_utils::SequenceIdentifierGenerator;

    fn create_test_catalog() -> CourseCatalog {
        CourseCatalog::new(Arc::new(SequenceIdentifierGenerator::new()))
    }

    #[tokio::test]
    async fn test_create_fills_documented_defaults() {
        let catalog = create_test_catalog();
        let course = catalog
            .create("admin-1", NewCourse::basic("Rust 入门", "org-1", "instructor-1"))
            .await
            .unwrap();

        assert_eq!(course.difficulty_level, DifficultyLevel::Beginner);
        assert_eq!(course.certificate_type, CertificateType::Completion);
        assert_eq!(course.enrollment_settings.method, EnrollmentMethod::Manual);
        assert!(!course.enrollment_settings.is_open);
        assert!(course.enrollment_settings.requires_approval);
        assert!(course.modules.is_empty());
        assert_eq!(course.stats, CourseStats::default());
        assert!(course.is_active);
        assert_eq!(course.instructor_name, "Instructor");
        assert_eq!(course.category, "General");
        assert_eq!(course.estimated_duration, 60);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_required_fields() {
        let catalog = create_test_catalog();

        let err = catalog
            .create("admin-1", NewCourse::basic("", "org-1", "instructor-1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        // 纯空白同样视为缺失
        let err = catalog
            .create("admin-1", NewCourse::basic("  ", "org-1", "instructor-1"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        assert!(catalog.courses().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_absent_returns_none() {
        let catalog = create_test_catalog();
        assert!(catalog.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_update_merges_partial_fields() {
        let catalog = create_test_catalog();
        let course = catalog
            .create("admin-1", NewCourse::basic("旧标题", "org-1", "instructor-1"))
            .await
            .unwrap();

        let updated = catalog
            .update(
                "admin-1",
                &course.id,
                CourseUpdate {
                    title: Some("新标题".to_string()),
                    difficulty_level: Some(DifficultyLevel::Advanced),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "新标题");
        assert_eq!(updated.difficulty_level, DifficultyLevel::Advanced);
        // 未携带的字段保持不变
        assert_eq!(updated.organization_id, "org-1");
        assert!(updated.updated_at >= course.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_leaves_catalog_unchanged() {
        let catalog = create_test_catalog();
        catalog
            .create("admin-1", NewCourse::basic("Rust 入门", "org-1", "instructor-1"))
            .await
            .unwrap();
        let before = catalog.courses().await;

        let err = catalog
            .update("admin-1", "missing", CourseUpdate::default())
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "COURSE_NOT_FOUND");
        let after = catalog.courses().await;
        assert_eq!(before.len(), after.len());
        assert_eq!(before[0].updated_at, after[0].updated_at);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let catalog = create_test_catalog();
        let course = catalog
            .create("admin-1", NewCourse::basic("Rust 入门", "org-1", "instructor-1"))
            .await
            .unwrap();

        assert!(catalog.delete("admin-1", &course.id).await.unwrap());
        assert!(!catalog.delete("admin-1", &course.id).await.unwrap());
        assert!(!catalog.delete("admin-1", "missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_enrollment_unknown_course() {
        let catalog = create_test_catalog();
        let err = catalog
            .apply_enrollment("missing", CourseStatsDelta::enrolled(1))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "COURSE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_apply_enrollment_accumulates() {
        let catalog = create_test_catalog();
        let course = catalog
            .create("admin-1", NewCourse::basic("Rust 入门", "org-1", "instructor-1"))
            .await
            .unwrap();

        catalog
            .apply_enrollment(&course.id, CourseStatsDelta::enrolled(5))
            .await
            .unwrap();
        let updated = catalog
            .apply_enrollment(&course.id, CourseStatsDelta::enrolled(3))
            .await
            .unwrap();

        assert_eq!(updated.stats.enrolled_students, 8);
    }

    #[tokio::test]
    async fn test_rejected_delta_keeps_stats_intact() {
        let catalog = create_test_catalog();
        let course = catalog
            .create("admin-1", NewCourse::basic("Rust 入门", "org-1", "instructor-1"))
            .await
            .unwrap();
        catalog
            .apply_enrollment(&course.id, CourseStatsDelta::enrolled(2))
            .await
            .unwrap();

        let err = catalog
            .apply_enrollment(&course.id, CourseStatsDelta::enrolled(-5))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let current = catalog.get(&course.id).await.unwrap();
        assert_eq!(current.stats.enrolled_students, 2);
    }

    #[tokio::test]
    async fn test_subscribe_sees_snapshot_after_each_mutation() {
        let catalog = create_test_catalog();
        let rx = catalog.subscribe();

        assert!(rx.borrow().is_empty());

        let course = catalog
            .create("admin-1", NewCourse::basic("Rust 入门", "org-1", "instructor-1"))
            .await
            .unwrap();
        assert_eq!(rx.borrow().len(), 1);

        catalog
            .apply_enrollment(&course.id, CourseStatsDelta::enrolled(4))
            .await
            .unwrap();
        assert_eq!(rx.borrow()[0].stats.enrolled_students, 4);

        catalog.delete("admin-1", &course.id).await.unwrap();
        assert!(rx.borrow().is_empty());
    }
}
