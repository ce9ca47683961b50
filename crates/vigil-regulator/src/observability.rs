//! # 可观测性
//!
//! 控制器只发出 `tracing` 事件，不持有任何订阅者：
//!
//! | 级别 | 事件 |
//! |---|---|
//! | `info` | 控制器启停 |
//! | `debug` | 授权、拒绝、续期、转交 |
//! | `trace` | 过期租约回收、被忽略的结束/续期调用 |
//!
//! 结构化字段统一使用 `collection`、`content_set`、`activity`、`current`、`relation`。
//!
//! 守护进程入口可开启 `fmt-subscriber` 特性，调用 [`install_fmt_subscriber`] 装配一个
//! 读取 `RUST_LOG` 的控制台订阅者。

#[cfg(feature = "fmt-subscriber")]
pub use fmt_subscriber::install_fmt_subscriber;

#[cfg(feature = "fmt-subscriber")]
mod fmt_subscriber {
    use tracing::dispatcher;
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

    use crate::error::RegulatorError;

    /// 安装全局 `fmt + EnvFilter` 订阅者。
    ///
    /// # 教案式说明
    /// - **意图（Why）**：独立部署控制器时无需宿主额外组装日志管线；
    /// - **逻辑（How）**：`RUST_LOG` 缺省或非法时回退到 `info`，再以 `registry()` 叠加过滤层与格式化层；
    /// - **契约（What）**：进程内已存在全局订阅者时返回 [`RegulatorError::SubscriberInstall`]，
    ///   不会覆盖既有订阅者。
    pub fn install_fmt_subscriber() -> Result<(), RegulatorError> {
        if dispatcher::has_been_set() {
            return Err(RegulatorError::SubscriberInstall {
                detail: "a global subscriber is already installed".to_owned(),
            });
        }
        let subscriber = tracing_subscriber::registry()
            .with(build_env_filter())
            .with(tracing_subscriber::fmt::layer());
        tracing::subscriber::set_global_default(subscriber).map_err(|err| {
            RegulatorError::SubscriberInstall {
                detail: err.to_string(),
            }
        })
    }

    fn build_env_filter() -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
