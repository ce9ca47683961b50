//! # error 模块说明
//!
//! ## 角色定位
//! - 准入被拒绝是常规结果，以 `bool` 返回，不属于错误；
//! - 本模块只承载真正的异常：协作方交来的标识无法编码为合法键、配置无法解析、
//!   全局日志订阅者安装失败。
//!
//! ## 设计要求
//! - 所有错误类型派生 [`thiserror::Error`]，携带足以排障的上下文字段；
//! - [`RegulatorError`] 聚合各子域错误，供只关心“是否失败”的调用方一次性 `?` 传播。

use thiserror::Error;

use crate::config::ConfigError;

/// 键构造或解析失败。
///
/// 这类错误意味着键构造协作方存在缺陷；经由 [`ActivityRegulator`](crate::ActivityRegulator)
/// 的能力 trait 入口遇到时会直接 panic，而 [`ContentSetKey::parse`](crate::ContentSetKey::parse)
/// 等显式解析入口以 `Result` 返回。
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum KeyError {
    /// 集合标识为空。
    #[error("collection id must not be empty")]
    EmptyCollectionId,

    /// 集合标识内含分隔符或以 `:` 结尾，编码后会与分隔符粘连。
    #[error("collection id `{collection}` contains `::` or ends with `:`")]
    SeparatorInCollectionId { collection: String },

    /// 文本键缺少必需的分隔符。
    #[error("content-set key `{key}` is missing the `::` separator")]
    MissingSeparator { key: String },

    /// 限定符既不是空、`.`，也不是 `[lower,upper]`。
    #[error("content-set key `{key}` carries malformed qualifier `{qualifier}`")]
    MalformedQualifier { key: String, qualifier: String },

    /// 文本键以未配对的转义符 `\` 结尾。
    #[error("content-set key `{key}` ends with a dangling escape")]
    DanglingEscape { key: String },
}

/// 控制器对外的聚合错误。
#[derive(Debug, Error)]
pub enum RegulatorError {
    /// 键错误。
    #[error(transparent)]
    Key(#[from] KeyError),

    /// 配置错误。
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 全局 `tracing` 订阅者已被安装。
    #[error("failed to install global tracing subscriber: {detail}")]
    SubscriberInstall { detail: String },
}
