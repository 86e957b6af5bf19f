//! 课程选课与邀请引擎
//!
//! 管理限时邀请码的完整生命周期，并将四种选课策略
//! （手动、批量/CSV、部门自动、邀请码兑换）收敛到共享课程目录的
//! 单一统计变更原语上，保证并发变更下课程统计的一致性。
//!
//! ## 核心功能
//!
//! - **课程目录**：课程记录的增删改查，统计数据的串行化原子变更
//! - **邀请注册表**：邀请码的创建、兑换、取消与过期观测，持久化镜像恢复
//! - **选课分发**：四种选课策略的校验与编排
//! - **花名册解析**：批量选课的 CSV 行过滤
//! - **快照订阅**：目录与注册表在每次变更后推送完整快照
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `service`: 业务服务层（目录、注册表、分发器）
//! - `lock`: 课程级串行化锁
//! - `directory`: 部门目录外部协作方接口
//! - `roster`: CSV 花名册解析
//! - `engine`: 引擎门面与生命周期管理

pub mod directory;
pub mod engine;
pub mod error;
pub mod lock;
pub mod models;
pub mod roster;
pub mod service;

pub use directory::{DepartmentDirectory, SimulatedDirectory};
pub use engine::EnrollmentEngine;
pub use error::{EnrollError, Result};
pub use models::*;
pub use roster::parse_roster;
pub use service::{
    CourseCatalog, EnrollmentDispatcher, EnrollmentSink, InvitationRegistry, dto,
};
