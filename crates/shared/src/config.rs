//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// 选课与邀请配置
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentConfig {
    /// 邀请码有效期（秒），默认 7 天
    pub invitation_ttl_seconds: i64,
    /// 邀请码长度
    pub code_length: usize,
    /// 邀请码生成冲突时的最大重试次数
    pub max_code_attempts: u32,
    /// 模拟部门花名册的人数下限
    pub department_roster_min: u32,
    /// 模拟部门花名册的人数上限
    pub department_roster_max: u32,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            invitation_ttl_seconds: 7 * 24 * 60 * 60,
            code_length: 8,
            max_code_attempts: 5,
            department_roster_min: 5,
            department_roster_max: 25,
        }
    }
}

impl EnrollmentConfig {
    /// 邀请码有效期，chrono 表示
    pub fn invitation_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.invitation_ttl_seconds)
    }
}

/// 持久化镜像配置
///
/// 邀请记录的持久化镜像只要求 key/value 能力，
/// backend 可选 `memory`（测试/演示）或 `file`（跨进程重启保留）。
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    pub backend: String,
    pub path: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: "data/invitations.json".to_string(),
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 日志输出格式：json（结构化）或 pretty（人类可读）
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub enrollment: EnrollmentConfig,
    pub mirror: MirrorConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（ENROLL_ 前缀，如 ENROLL_MIRROR_PATH -> mirror.path）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("ENROLL_ENV").unwrap_or_else(|_| "development".to_string());

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            // 默认配置
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            // 加载默认配置文件
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            // 加载环境特定配置
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            // 加载服务特定配置（如 enrollment-service.toml）
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            // 环境变量覆盖（ENROLL_MIRROR_PATH -> mirror.path）
            .add_source(
                Environment::with_prefix("ENROLL")
                    .separator("_")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}
