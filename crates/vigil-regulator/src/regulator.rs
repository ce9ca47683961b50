//! # ActivityRegulator：对外门面
//!
//! ## 设计目的（Why）
//! - 采集、投票、树遍历等引擎分别运行在各自线程上，需要一个共享的裁决者；
//! - 账本本身是纯状态机，本模块负责把它与时钟、配置、运行开关以及一把互斥锁组装起来。
//!
//! ## 契约说明（What）
//! - 每个公开操作在整个函数体内持有同一把 [`parking_lot::Mutex`]，两张表的推理因此是原子的；
//! - 键在加锁前由能力对象派生，协作方代码从不在锁内执行；
//! - 所有 `start_*` 都是非阻塞的尝试获取，拒绝即返回 `false`；
//! - 构造后即处于运行状态；[`stop`](ActivityRegulator::stop) 清空账本并拒绝后续启动，
//!   [`start`](ActivityRegulator::start) 重新放行。
//!
//! ## 前置条件
//! 经由能力 trait 交入的集合/内容集必须能编码为合法键；否则视为协作方缺陷，直接 panic。

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::activity::{CollectionActivity, ContentSetActivity};
use crate::config::{LeaseSettings, RegulatorConfig};
use crate::key::{ArchivalCollection, CachedContentSet, CollectionKey, ContentSetKey};
use crate::ledger::{ActivityLedger, ContentSetRequest, LedgerSnapshot};
use crate::time::{Clock, SystemClock};

/// 活动准入控制器。
///
/// 通常以 `Arc<ActivityRegulator>` 在各引擎之间共享。
pub struct ActivityRegulator {
    state: Mutex<RegulatorState>,
    clock: Arc<dyn Clock>,
    config: RegulatorConfig,
}

struct RegulatorState {
    ledger: ActivityLedger,
    running: bool,
}

impl ActivityRegulator {
    /// 使用系统时钟与默认配置构造。
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 注入时钟，测试中通常传入 [`MockClock`](crate::MockClock)。
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, RegulatorConfig::default())
    }

    /// 注入时钟与配置。
    pub fn with_config(clock: Arc<dyn Clock>, config: RegulatorConfig) -> Self {
        Self {
            state: Mutex::new(RegulatorState {
                ledger: ActivityLedger::new(),
                running: true,
            }),
            clock,
            config,
        }
    }

    /// 当前租约设置；调用方未另行指定时以此作为租约与续期长度。
    pub fn lease_settings(&self) -> &LeaseSettings {
        &self.config.leases
    }

    /// 重新放行启动请求。
    pub fn start(&self) {
        let mut state = self.state.lock();
        if !state.running {
            state.running = true;
            info!("activity regulator started");
        }
    }

    /// 清空全部授权并拒绝后续启动，直到再次调用 [`start`](Self::start)。
    pub fn stop(&self) {
        let mut state = self.state.lock();
        let dropped = state.ledger.len();
        state.ledger.clear();
        state.running = false;
        info!(dropped, "activity regulator stopped");
    }

    /// 是否处于运行状态。
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// 尝试在集合上启动 `kind`，成功时持有 `lease` 时长的租约。
    ///
    /// # Panics
    /// 集合标识无法编码为合法键时 panic。
    pub fn start_collection_activity(
        &self,
        kind: CollectionActivity,
        collection: &(impl ArchivalCollection + ?Sized),
        lease: Duration,
    ) -> bool {
        let key = collection_key(collection);
        let mut state = self.state.lock();
        if !state.running {
            debug!(
                collection = %key,
                name = collection.display_name(),
                activity = %kind,
                "regulator stopped, activity denied"
            );
            return false;
        }
        let now = self.clock.now();
        state.ledger.try_start_collection(kind, &key, now, lease)
    }

    /// 尝试在内容集上启动 `kind`。
    ///
    /// 依次对所属集合、内容集自身以及所有存在祖先/后代关系的存活内容集做准入检查；
    /// 成功后所属集合被标记为 [`CollectionActivity::ContentSetActivity`]。
    ///
    /// # Panics
    /// 内容集无法编码为合法键时 panic。
    pub fn start_content_set_activity(
        &self,
        kind: ContentSetActivity,
        content_set: &(impl CachedContentSet + ?Sized),
        lease: Duration,
    ) -> bool {
        let key = content_set_key(content_set);
        let mut state = self.state.lock();
        if !state.running {
            debug!(content_set = %key, activity = %kind, "regulator stopped, activity denied");
            return false;
        }
        let now = self.clock.now();
        state.ledger.try_start_content_set(kind, &key, now, lease)
    }

    /// 结束集合上的 `kind`。若集合当前已不是 `kind`（已过期或被他人接手），调用被忽略。
    ///
    /// # Panics
    /// 集合标识无法编码为合法键时 panic。
    pub fn finish_collection_activity(
        &self,
        kind: CollectionActivity,
        collection: &(impl ArchivalCollection + ?Sized),
    ) {
        let key = collection_key(collection);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.finish_collection(kind, &key, now);
    }

    /// 结束内容集上的 `kind`；集合内最后一个内容集活动结束时，集合标记一并清除。
    ///
    /// # Panics
    /// 内容集无法编码为合法键时 panic。
    pub fn finish_content_set_activity(
        &self,
        kind: ContentSetActivity,
        content_set: &(impl CachedContentSet + ?Sized),
    ) {
        let key = content_set_key(content_set);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.finish_content_set(kind, &key, now);
    }

    /// 集合当前的活动，过期租约在此被回收。
    ///
    /// # Panics
    /// 集合标识无法编码为合法键时 panic。
    pub fn collection_activity(
        &self,
        collection: &(impl ArchivalCollection + ?Sized),
    ) -> CollectionActivity {
        let key = collection_key(collection);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.collection_activity(&key, now)
    }

    /// 内容集当前的活动，过期租约在此被回收。
    ///
    /// # Panics
    /// 内容集无法编码为合法键时 panic。
    pub fn content_set_activity(
        &self,
        content_set: &(impl CachedContentSet + ?Sized),
    ) -> ContentSetActivity {
        let key = content_set_key(content_set);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.content_set_activity(&key, now)
    }

    /// 把仍由调用方持有的集合租约推后 `extension`。
    ///
    /// # Panics
    /// 集合标识无法编码为合法键时 panic。
    pub fn extend_collection_activity(
        &self,
        kind: CollectionActivity,
        collection: &(impl ArchivalCollection + ?Sized),
        extension: Duration,
    ) -> bool {
        let key = collection_key(collection);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.extend_collection(kind, &key, now, extension)
    }

    /// 以配置的续期长度（[`LeaseSettings::extension`]）推后集合租约。
    ///
    /// # Panics
    /// 集合标识无法编码为合法键时 panic。
    pub fn renew_collection_activity(
        &self,
        kind: CollectionActivity,
        collection: &(impl ArchivalCollection + ?Sized),
    ) -> bool {
        self.extend_collection_activity(kind, collection, self.config.leases.extension())
    }

    /// 把仍由调用方持有的内容集租约推后 `extension`，集合标记随之推后。
    ///
    /// # Panics
    /// 内容集无法编码为合法键时 panic。
    pub fn extend_content_set_activity(
        &self,
        kind: ContentSetActivity,
        content_set: &(impl CachedContentSet + ?Sized),
        extension: Duration,
    ) -> bool {
        let key = content_set_key(content_set);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.extend_content_set(kind, &key, now, extension)
    }

    /// 以配置的续期长度推后内容集租约。
    ///
    /// # Panics
    /// 内容集无法编码为合法键时 panic。
    pub fn renew_content_set_activity(
        &self,
        kind: ContentSetActivity,
        content_set: &(impl CachedContentSet + ?Sized),
    ) -> bool {
        self.extend_content_set_activity(kind, content_set, self.config.leases.extension())
    }

    /// 把集合上仍由调用方持有的 `held` 就地改为 `new`，租约重新计为 `lease`。
    ///
    /// 典型用法：复用已持有的授权开始下一阶段工作，例如由顶层投票转入新内容采集。
    /// 改变种类不再经过准入矩阵。
    ///
    /// # Panics
    /// 集合标识无法编码为合法键时 panic。
    pub fn change_collection_activity(
        &self,
        held: CollectionActivity,
        new: CollectionActivity,
        collection: &(impl ArchivalCollection + ?Sized),
        lease: Duration,
    ) -> bool {
        let key = collection_key(collection);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.change_collection(held, new, &key, now, lease)
    }

    /// 把内容集上仍由调用方持有的 `held` 就地改为 `new`，例如内容投票结束后
    /// 在同一节点上转入修复采集；集合标记至少延续到新的截止时间。
    ///
    /// # Panics
    /// 内容集无法编码为合法键时 panic。
    pub fn change_content_set_activity(
        &self,
        held: ContentSetActivity,
        new: ContentSetActivity,
        content_set: &(impl CachedContentSet + ?Sized),
        lease: Duration,
    ) -> bool {
        let key = content_set_key(content_set);
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.change_content_set(held, new, &key, now, lease)
    }

    /// 把集合上持有的 `held` 转交为一批内容集授权，返回成功授权的键。
    ///
    /// 转交期间集合标记以 [`LeaseSettings::default_lease`] 为临时租约，
    /// 结束时改为集合内最长的存活内容集租约；一个都未授权时标记被清除。
    ///
    /// # Panics
    /// 集合标识无法编码为合法键时 panic。
    pub fn convert_to_content_set_activities(
        &self,
        held: CollectionActivity,
        collection: &(impl ArchivalCollection + ?Sized),
        requests: &[ContentSetRequest],
    ) -> Vec<ContentSetKey> {
        let key = collection_key(collection);
        let mut state = self.state.lock();
        if !state.running {
            debug!(collection = %key, held = %held, "regulator stopped, conversion denied");
            return Vec::new();
        }
        let now = self.clock.now();
        let handover = self.config.leases.default_lease();
        state
            .ledger
            .convert_to_content_sets(held, &key, requests, now, handover)
    }

    /// 单个内容集的转交。
    ///
    /// # Panics
    /// 集合或内容集无法编码为合法键时 panic。
    pub fn convert_to_content_set_activity(
        &self,
        held: CollectionActivity,
        collection: &(impl ArchivalCollection + ?Sized),
        kind: ContentSetActivity,
        content_set: &(impl CachedContentSet + ?Sized),
        lease: Duration,
    ) -> bool {
        let request = ContentSetRequest::for_key(kind, content_set_key(content_set), lease);
        !self
            .convert_to_content_set_activities(held, collection, &[request])
            .is_empty()
    }

    /// 存活授权的诊断快照。
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut state = self.state.lock();
        let now = self.clock.now();
        state.ledger.snapshot(now)
    }
}

impl Default for ActivityRegulator {
    fn default() -> Self {
        Self::new()
    }
}

fn collection_key(collection: &(impl ArchivalCollection + ?Sized)) -> CollectionKey {
    CollectionKey::of(collection).unwrap_or_else(|err| {
        panic!(
            "collection `{}` cannot be keyed: {err}",
            collection.display_name()
        )
    })
}

fn content_set_key(content_set: &(impl CachedContentSet + ?Sized)) -> ContentSetKey {
    ContentSetKey::of(content_set)
        .unwrap_or_else(|err| panic!("content set `{}` cannot be keyed: {err}", content_set.url()))
}
