//! 选课引擎门面
//!
//! 进程启动时构造一次的显式持有对象：组装目录、注册表与分发器，
//! 生命周期为显式 init（恢复持久化镜像）与 shutdown（刷写存储），
//! 不依赖任何模块级全局状态。外部协作层（UI 等）只与本门面交互。

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument};

use enrollment_shared::config::AppConfig;
use enrollment_shared::ident::{IdentifierGenerator, RandomIdentifierGenerator};
use enrollment_shared::store::{DurableStore, FileStore, MemoryStore};

use crate::directory::{DepartmentDirectory, SimulatedDirectory};
use crate::error::Result;
use crate::models::{Course, InvitationRecord};
use crate::service::catalog::CourseCatalog;
use crate::service::dispatcher::EnrollmentDispatcher;
use crate::service::dto::{
    CourseUpdate, EnrollmentOutcome, EnrollmentRequest, NewCourse, StudentRecord,
};
use crate::service::registry::InvitationRegistry;
use crate::service::traits::EnrollmentSink;

/// 选课引擎
pub struct EnrollmentEngine {
    catalog: Arc<CourseCatalog>,
    registry: Arc<InvitationRegistry>,
    dispatcher: EnrollmentDispatcher,
    store: Arc<dyn DurableStore>,
}

impl EnrollmentEngine {
    /// 用注入的能力组装引擎并恢复邀请镜像
    pub async fn init(
        config: &AppConfig,
        store: Arc<dyn DurableStore>,
        idgen: Arc<dyn IdentifierGenerator>,
        directory: Arc<dyn DepartmentDirectory>,
    ) -> Result<Self> {
        let catalog = Arc::new(CourseCatalog::new(idgen.clone()));
        let registry = Arc::new(InvitationRegistry::new(
            store.clone(),
            idgen,
            config.enrollment.clone(),
        ));

        let restored = registry.load().await?;

        let sink: Arc<dyn EnrollmentSink> = catalog.clone();
        let dispatcher = EnrollmentDispatcher::new(sink, registry.clone(), directory);

        info!(restored, "选课引擎已初始化");
        Ok(Self {
            catalog,
            registry,
            dispatcher,
            store,
        })
    }

    /// 按配置组装生产默认能力：镜像后端、随机标识符、模拟部门目录
    #[instrument(skip(config), fields(backend = %config.mirror.backend))]
    pub async fn with_defaults(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn DurableStore> = match config.mirror.backend.as_str() {
            "file" => Arc::new(FileStore::open(&config.mirror.path).await?),
            _ => Arc::new(MemoryStore::new()),
        };
        let idgen = Arc::new(RandomIdentifierGenerator::new(config.enrollment.code_length));
        let directory = Arc::new(SimulatedDirectory::new(
            config.enrollment.department_roster_min,
            config.enrollment.department_roster_max,
        ));

        Self::init(config, store, idgen, directory).await
    }

    /// 刷写存储并结束引擎生命周期
    pub async fn shutdown(&self) -> Result<()> {
        self.store.flush().await?;
        info!("选课引擎已关停");
        Ok(())
    }

    // ==================== 课程目录 ====================

    /// 课程快照流：立即持有当前快照，此后每次变更推送
    pub fn subscribe_courses(&self) -> watch::Receiver<Vec<Course>> {
        self.catalog.subscribe()
    }

    pub async fn courses(&self) -> Vec<Course> {
        self.catalog.courses().await
    }

    pub async fn get_course(&self, id: &str) -> Option<Course> {
        self.catalog.get(id).await
    }

    pub async fn create_course(&self, actor: &str, request: NewCourse) -> Result<Course> {
        self.catalog.create(actor, request).await
    }

    pub async fn update_course(
        &self,
        actor: &str,
        id: &str,
        update: CourseUpdate,
    ) -> Result<Course> {
        self.catalog.update(actor, id, update).await
    }

    pub async fn delete_course(&self, actor: &str, id: &str) -> Result<bool> {
        self.catalog.delete(actor, id).await
    }

    // ==================== 选课 ====================

    pub async fn enroll(
        &self,
        actor: &str,
        request: EnrollmentRequest,
    ) -> Result<EnrollmentOutcome> {
        self.dispatcher.enroll(actor, request).await
    }

    // ==================== 邀请 ====================

    pub async fn create_invitation(
        &self,
        actor: &str,
        course_id: &str,
        student_email: Option<String>,
    ) -> Result<InvitationRecord> {
        self.registry.create(actor, course_id, student_email).await
    }

    /// 兑换邀请码并完成选课，成功返回 true，失败以类型化错误上抛
    pub async fn redeem_invitation(&self, code: &str, student: StudentRecord) -> Result<bool> {
        let actor = student.email.clone();
        self.dispatcher
            .enroll(
                &actor,
                EnrollmentRequest::InvitationRedeem {
                    code: code.to_string(),
                    student,
                },
            )
            .await
            .map(|_| true)
    }

    pub async fn cancel_invitation(
        &self,
        actor: &str,
        invitation_id: &str,
    ) -> Result<InvitationRecord> {
        self.registry.cancel(actor, invitation_id).await
    }

    pub async fn invitations(&self, course_id: Option<&str>) -> Vec<InvitationRecord> {
        self.registry.list(course_id).await
    }

    /// 邀请快照流
    pub fn subscribe_invitations(&self) -> watch::Receiver<Vec<InvitationRecord>> {
        self.registry.subscribe()
    }
}
