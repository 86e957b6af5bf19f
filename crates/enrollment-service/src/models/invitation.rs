//! 邀请相关实体定义
//!
//! 包含邀请记录和持久化镜像记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::InvitationStatus;

/// 邀请记录
///
/// 状态机：`PENDING -> ACCEPTED`（过期前兑换）、
/// `PENDING -> EXPIRED`（过期后被观测）、`PENDING -> CANCELLED`（显式取消）。
/// 过期是读取/兑换时对时钟的判定，不预先落库——
/// 因此记录的有效状态可能已是 EXPIRED，而存储的状态字段仍为 PENDING，
/// 直到下一次变更观测到并持久化这一事实。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationRecord {
    pub id: String,
    /// 所属课程 ID
    pub course_id: String,
    /// 邀请码（PENDING 记录间唯一）
    pub invitation_code: String,
    /// 创建者身份（显式传入，不依赖环境态）
    pub created_by: String,
    /// 定向学生邮箱
    #[serde(default)]
    pub student_email: Option<String>,
    /// 存储状态
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    /// 兑换时间（ACCEPTED 后有值）
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,
    /// 兑换者身份（ACCEPTED 后有值）
    #[serde(default)]
    pub used_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InvitationRecord {
    /// 给定时刻是否已过期
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// 给定时刻的有效状态
    ///
    /// 存储状态为 PENDING 但已过有效期的记录，有效状态为 EXPIRED。
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.status == InvitationStatus::Pending && self.is_expired(now) {
            InvitationStatus::Expired
        } else {
            self.status
        }
    }

    /// 是否可被兑换
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && !self.is_expired(now)
    }
}

/// 持久化镜像记录
///
/// 外部持久化边界的固定行格式，以邀请码为键。
/// 创建时写入，兑换时删除，使未兑换的邀请码跨进程重启保持有效。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorRecord {
    pub code: String,
    pub course_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl MirrorRecord {
    pub fn from_record(record: &InvitationRecord) -> Self {
        Self {
            code: record.invitation_code.clone(),
            course_id: record.course_id.clone(),
            expires_at: record.expires_at,
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_record(expires_in: Duration) -> InvitationRecord {
        let now = Utc::now();
        InvitationRecord {
            id: "inv-1".to_string(),
            course_id: "course-1".to_string(),
            invitation_code: "ABCD2345".to_string(),
            created_by: "instructor-1".to_string(),
            student_email: None,
            status: InvitationStatus::Pending,
            expires_at: now + expires_in,
            used_at: None,
            used_by: None,
            created_at: now,
        }
    }

    #[test]
    fn test_effective_status_reports_expiry_without_mutation() {
        let record = create_test_record(Duration::days(-1));
        let now = Utc::now();

        // 存储状态仍是 PENDING，有效状态已是 EXPIRED
        assert_eq!(record.status, InvitationStatus::Pending);
        assert_eq!(record.effective_status(now), InvitationStatus::Expired);
        assert!(!record.is_redeemable(now));
    }

    #[test]
    fn test_pending_unexpired_is_redeemable() {
        let record = create_test_record(Duration::days(7));
        let now = Utc::now();

        assert_eq!(record.effective_status(now), InvitationStatus::Pending);
        assert!(record.is_redeemable(now));
    }

    #[test]
    fn test_terminal_status_wins_over_clock() {
        let mut record = create_test_record(Duration::days(7));
        record.status = InvitationStatus::Cancelled;

        assert_eq!(
            record.effective_status(Utc::now()),
            InvitationStatus::Cancelled
        );
        assert!(!record.is_redeemable(Utc::now()));
    }

    #[test]
    fn test_mirror_record_layout() {
        let record = create_test_record(Duration::days(7));
        let mirror = MirrorRecord::from_record(&record);
        let json = serde_json::to_value(&mirror).unwrap();

        assert_eq!(json["code"], "ABCD2345");
        assert_eq!(json["courseId"], "course-1");
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("createdAt").is_some());
        // 镜像行只有四个字段，不携带创建者等附加信息
        assert_eq!(json.as_object().unwrap().len(), 4);
    }
}
