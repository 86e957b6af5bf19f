//! 邀请注册表
//!
//! 邀请记录生命周期的唯一所有方，包括：
//! - 创建（邀请码在 PENDING 记录间唯一，冲突时有界重试）
//! - 兑换（过期判定、单次兑换、镜像删除）
//! - 取消与过期观测
//! - 持久化镜像的写入与启动恢复
//!
//! ## 兑换流程
//!
//! 1. 按邀请码在 PENDING 记录中查找 -> 2. 过期判定
//!    -> 3. 删除镜像 -> 4. 状态迁移 -> 5. 发布快照

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{RwLock, watch};
use tracing::{info, instrument, warn};

use enrollment_shared::config::EnrollmentConfig;
use enrollment_shared::ident::IdentifierGenerator;
use enrollment_shared::store::DurableStore;

use crate::error::{EnrollError, Result};
use crate::models::{InvitationRecord, InvitationStatus, MirrorRecord};
use crate::service::dto::StudentRecord;

/// 镜像键生成
mod mirror_keys {
    pub const PREFIX: &str = "invitation:";

    pub fn invitation(code: &str) -> String {
        format!("{PREFIX}{code}")
    }
}

/// 邀请注册表
pub struct InvitationRegistry {
    records: RwLock<Vec<InvitationRecord>>,
    snapshot_tx: watch::Sender<Vec<InvitationRecord>>,
    store: Arc<dyn DurableStore>,
    idgen: Arc<dyn IdentifierGenerator>,
    config: EnrollmentConfig,
}

impl InvitationRegistry {
    pub fn new(
        store: Arc<dyn DurableStore>,
        idgen: Arc<dyn IdentifierGenerator>,
        config: EnrollmentConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(Vec::new());
        Self {
            records: RwLock::new(Vec::new()),
            snapshot_tx,
            store,
            idgen,
            config,
        }
    }

    /// 订阅邀请快照
    pub fn subscribe(&self) -> watch::Receiver<Vec<InvitationRecord>> {
        self.snapshot_tx.subscribe()
    }

    /// 从持久化镜像恢复未兑换的邀请
    ///
    /// 进程启动时调用一次：每条镜像行恢复为一条 PENDING 记录，
    /// 已过有效期的行直接从镜像中清除。镜像行不携带创建者和
    /// 定向邮箱，恢复出的记录这两项为空。返回恢复的记录数。
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize> {
        let keys = self.store.keys(mirror_keys::PREFIX).await?;
        let now = Utc::now();
        let mut restored = Vec::new();
        let mut pruned = 0usize;

        for key in keys {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            let mirror: MirrorRecord = serde_json::from_str(&raw)?;

            if now > mirror.expires_at {
                self.store.delete(&key).await?;
                pruned += 1;
                continue;
            }

            restored.push(InvitationRecord {
                id: self.idgen.entity_id(),
                course_id: mirror.course_id,
                invitation_code: mirror.code,
                created_by: String::new(),
                student_email: None,
                status: InvitationStatus::Pending,
                expires_at: mirror.expires_at,
                used_at: None,
                used_by: None,
                created_at: mirror.created_at,
            });
        }

        restored.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let count = restored.len();

        let mut records = self.records.write().await;
        *records = restored;
        self.publish(&records);
        drop(records);

        info!(restored = count, pruned, "邀请镜像已恢复");
        Ok(count)
    }

    /// 创建邀请
    ///
    /// 邀请码生成与唯一性校验在同一写锁临界区内完成，
    /// 并发创建不可能产出两个相同的 PENDING 邀请码；
    /// 冲突时重新生成，超过重试上限返回 `CodeCollisionExhausted`。
    /// 镜像写入成功后记录才对外可见。
    #[instrument(skip(self), fields(actor = %actor, course_id = %course_id))]
    pub async fn create(
        &self,
        actor: &str,
        course_id: &str,
        student_email: Option<String>,
    ) -> Result<InvitationRecord> {
        if course_id.trim().is_empty() {
            return Err(EnrollError::Validation("课程 ID 不能为空".to_string()));
        }

        let mut records = self.records.write().await;

        let mut code = None;
        for attempt in 0..self.config.max_code_attempts {
            let candidate = self.idgen.invitation_code();
            let taken = records
                .iter()
                .any(|r| r.status == InvitationStatus::Pending && r.invitation_code == candidate);
            if !taken {
                code = Some(candidate);
                break;
            }
            warn!(attempt, "邀请码冲突，重新生成");
        }
        let code = code.ok_or(EnrollError::CodeCollisionExhausted {
            attempts: self.config.max_code_attempts,
        })?;

        let now = Utc::now();
        let record = InvitationRecord {
            id: self.idgen.entity_id(),
            course_id: course_id.to_string(),
            invitation_code: code,
            created_by: actor.to_string(),
            student_email,
            status: InvitationStatus::Pending,
            expires_at: now + self.config.invitation_ttl(),
            used_at: None,
            used_by: None,
            created_at: now,
        };

        let mirror = serde_json::to_string(&MirrorRecord::from_record(&record))?;
        self.store
            .set(&mirror_keys::invitation(&record.invitation_code), &mirror)
            .await?;

        records.push(record.clone());
        self.publish(&records);
        drop(records);

        info!(
            invitation_id = %record.id,
            code = %record.invitation_code,
            expires_at = %record.expires_at,
            "邀请已创建"
        );
        Ok(record)
    }

    /// 兑换邀请
    ///
    /// 只在 PENDING 记录中按邀请码查找——已消费与从未存在的码
    /// 同样表现为 `InvitationNotFound`。已过有效期的记录在此处
    /// 把存储状态修正为 EXPIRED 并返回 `InvitationExpired`，
    /// 后续查找无需再次对时钟判定。每条记录至多成功兑换一次。
    #[instrument(skip(self, student), fields(code = %code))]
    pub async fn redeem(&self, code: &str, student: &StudentRecord) -> Result<InvitationRecord> {
        let mut records = self.records.write().await;

        let Some(pos) = records
            .iter()
            .position(|r| r.status == InvitationStatus::Pending && r.invitation_code == code)
        else {
            return Err(EnrollError::InvitationNotFound(code.to_string()));
        };

        let now = Utc::now();
        if records[pos].is_expired(now) {
            records[pos].status = InvitationStatus::Expired;
            let expired_at = records[pos].expires_at;

            // 镜像里的过期行已无法兑换，顺手清除；失败只记录不阻断
            if let Err(e) = self.store.delete(&mirror_keys::invitation(code)).await {
                warn!(code = %code, error = %e, "清除过期镜像行失败");
            }

            self.publish(&records);
            drop(records);

            info!(code = %code, "邀请兑换被拒绝：已过期");
            return Err(EnrollError::InvitationExpired {
                code: code.to_string(),
                expired_at,
            });
        }

        // 先删镜像再迁移状态：镜像删除失败时记录仍为 PENDING，可重试
        self.store.delete(&mirror_keys::invitation(code)).await?;

        let record = &mut records[pos];
        record.status = InvitationStatus::Accepted;
        record.used_at = Some(now);
        record.used_by = Some(student.email.clone());
        let redeemed = record.clone();

        self.publish(&records);
        drop(records);

        info!(
            invitation_id = %redeemed.id,
            course_id = %redeemed.course_id,
            used_by = %student.email,
            "邀请兑换成功"
        );
        Ok(redeemed)
    }

    /// 取消邀请
    ///
    /// 仅 PENDING 记录可取消；终态记录与未知 ID 同样返回
    /// `InvitationNotFound`。
    #[instrument(skip(self), fields(actor = %actor, invitation_id = %invitation_id))]
    pub async fn cancel(&self, actor: &str, invitation_id: &str) -> Result<InvitationRecord> {
        let mut records = self.records.write().await;

        let Some(pos) = records
            .iter()
            .position(|r| r.status == InvitationStatus::Pending && r.id == invitation_id)
        else {
            return Err(EnrollError::InvitationNotFound(invitation_id.to_string()));
        };

        self.store
            .delete(&mirror_keys::invitation(&records[pos].invitation_code))
            .await?;

        records[pos].status = InvitationStatus::Cancelled;
        let cancelled = records[pos].clone();

        self.publish(&records);
        drop(records);

        info!(invitation_id = %invitation_id, "邀请已取消");
        Ok(cancelled)
    }

    /// 列出邀请记录，可按课程过滤，保持插入顺序
    pub async fn list(&self, course_id: Option<&str>) -> Vec<InvitationRecord> {
        let records = self.records.read().await;
        match course_id {
            Some(course_id) => records
                .iter()
                .filter(|r| r.course_id == course_id)
                .cloned()
                .collect(),
            None => records.clone(),
        }
    }

    fn publish(&self, records: &[InvitationRecord]) {
        self.snapshot_tx.send_replace(records.to_vec());
    }
}
