#![deny(unsafe_code)]
#![doc = "vigil-regulator: 保存节点的活动准入控制器。"]
#![doc = ""]
#![doc = "采集（新内容、修复、后台）、投票（顶层、内容、名称）与树遍历都会竞争同一批归档内容。"]
#![doc = "控制器在每次活动启动前裁决是否放行，以租约形式记录授权，并在访问时惰性回收过期租约。"]
#![doc = ""]
#![doc = "== 命名空间 =="]
#![doc = "两级结构：顶层为集合（Archival Unit），第二级为集合内按 URL 前缀嵌套的内容集（CachedUrlSet）。"]
#![doc = "所有 `start_*` 调用都是非阻塞的尝试获取；重试与退避由调用方决定。"]

//! ## 模块导览
//! - [`activity`]：两族活动枚举及其诊断标签；
//! - [`key`]：集合/内容集键的构造、解析与结构关系判定；
//! - [`lease`]：带截止时间的租约条目；
//! - [`admission`]：集合级与内容集级的准入矩阵（纯函数）；
//! - [`ledger`]：两张租约表及其上的全部账本操作（不含锁）；
//! - [`regulator`]：对外门面，以单把互斥锁串行化所有操作；
//! - [`config`]、[`error`]、[`time`]、[`observability`]：配置、错误、时钟与日志等环境设施。
//!
//! ## 快速上手
//!
//! ```rust
//! use std::time::Duration;
//! use vigil_regulator::{
//!     ActivityRegulator, CollectionActivity, CollectionRef, ContentSetActivity, ContentSetRef,
//! };
//!
//! let regulator = ActivityRegulator::new();
//! let journal = CollectionRef::new("C1");
//! let volume = ContentSetRef::subtree("C1", "/journal/v1");
//!
//! assert!(regulator.start_content_set_activity(
//!     ContentSetActivity::StandardContentPoll,
//!     &volume,
//!     Duration::from_secs(60),
//! ));
//! // 内容集活动进行中，集合级新内容采集被拒绝。
//! assert!(!regulator.start_collection_activity(
//!     CollectionActivity::NewContentCrawl,
//!     &journal,
//!     Duration::from_secs(60),
//! ));
//! regulator.finish_content_set_activity(ContentSetActivity::StandardContentPoll, &volume);
//! assert!(regulator.start_collection_activity(
//!     CollectionActivity::NewContentCrawl,
//!     &journal,
//!     Duration::from_secs(60),
//! ));
//! ```

pub mod activity;
pub mod admission;
pub mod config;
pub mod error;
pub mod key;
pub mod lease;
pub mod ledger;
pub mod observability;
pub mod regulator;
pub mod time;

pub use activity::{Activity, CollectionActivity, ContentSetActivity, describe};
pub use admission::{collection_admits, content_set_admits};
pub use config::{ConfigError, LeaseField, LeaseSettings, RegulatorConfig};
pub use error::RegulatorError;
pub use key::{
    ArchivalCollection, CachedContentSet, CollectionKey, CollectionRef, ContentSetKey,
    ContentSetRef, KeyError, Qualifier, Relation,
};
pub use lease::LeaseEntry;
pub use ledger::{ActivityLedger, ContentSetRequest, GrantSnapshot, LedgerSnapshot};
pub use regulator::ActivityRegulator;
pub use time::{Clock, MockClock, SystemClock};
