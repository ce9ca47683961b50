//! # 控制器配置
//!
//! ### 设计目的（Why）
//! - 把默认租约与续期长度集中在一处，避免采集、投票各自硬编码一小时；
//! - 以 TOML 承载，宿主可在自身配置文件中嵌入 `[leases]` 段。
//!
//! ### 契约说明（What）
//! ```toml
//! [leases]
//! default_lease_ms = 3600000
//! extension_ms = 3600000
//! ```
//! 两个字段都可省略，省略时取一小时；显式给出 0 视为配置错误。

use core::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const ONE_HOUR_MS: u64 = 60 * 60 * 1000;

/// 控制器顶层配置。
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RegulatorConfig {
    /// 租约长度设置。
    pub leases: LeaseSettings,
}

impl RegulatorConfig {
    /// 解析 TOML 文本并校验取值。
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse { source })?;
        config.leases.validate()?;
        Ok(config)
    }
}

/// 租约长度设置。
///
/// - `default_lease`：调用方未显式指定租约时使用的时长；
/// - `extension`：续期调用未显式指定时推后的时长。
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LeaseSettings {
    default_lease_ms: u64,
    extension_ms: u64,
}

impl LeaseSettings {
    /// 以自定义时长构造；不足一毫秒的部分向上取整，为 0 的时长被拒绝。
    pub fn new(default_lease: Duration, extension: Duration) -> Result<Self, ConfigError> {
        let settings = Self {
            default_lease_ms: whole_millis(default_lease),
            extension_ms: whole_millis(extension),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// 默认租约时长。
    pub const fn default_lease(&self) -> Duration {
        Duration::from_millis(self.default_lease_ms)
    }

    /// 默认续期时长。
    pub const fn extension(&self) -> Duration {
        Duration::from_millis(self.extension_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_lease_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: LeaseField::DefaultLease,
            });
        }
        if self.extension_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: LeaseField::Extension,
            });
        }
        Ok(())
    }
}

impl Default for LeaseSettings {
    fn default() -> Self {
        Self {
            default_lease_ms: ONE_HOUR_MS,
            extension_ms: ONE_HOUR_MS,
        }
    }
}

fn whole_millis(duration: Duration) -> u64 {
    let millis = duration.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// 配置解析过程中可能出现的错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 语法或字段类型错误。
    #[error("failed to parse regulator config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },

    /// 时长字段为 0。
    #[error("`{field}` must be a positive number of milliseconds")]
    ZeroDuration { field: LeaseField },
}

/// 出错的租约字段，显示为 TOML 中的路径。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LeaseField {
    /// `leases.default_lease_ms`
    DefaultLease,
    /// `leases.extension_ms`
    Extension,
}

impl fmt::Display for LeaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaseField::DefaultLease => f.write_str("leases.default_lease_ms"),
            LeaseField::Extension => f.write_str("leases.extension_ms"),
        }
    }
}
