//! # ActivityLedger：租约账本
//!
//! ## 核心职责
//! - 持有两张表：集合键 → 集合级租约，内容集键 → 内容集级租约；
//! - 实现全部账本操作：准入、安装、结束、续期、集合授权到内容集授权的转交、诊断快照；
//! - 过期惰性生效：任何查询发现过期条目都会就地删除并按 `NoActivity` 处理。
//!
//! ## 架构定位
//! - 账本本身不加锁、不读时钟，调用方显式传入 `now`；
//! - [`ActivityRegulator`](crate::ActivityRegulator) 以一把互斥锁包裹账本，保证一次操作内
//!   对两张表的推理是原子的。
//!
//! ## 代价
//! 启动内容集活动需要扫描全部存活的内容集租约，复杂度为 O(存活授权数)。

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::activity::{Activity, CollectionActivity, ContentSetActivity};
use crate::admission::{collection_admits, content_set_admits};
use crate::key::{CachedContentSet, CollectionKey, ContentSetKey, KeyError, Relation};
use crate::lease::LeaseEntry;

/// 两张租约表。
#[derive(Debug, Default)]
pub struct ActivityLedger {
    collections: HashMap<CollectionKey, LeaseEntry<CollectionActivity>>,
    content_sets: HashMap<ContentSetKey, LeaseEntry<ContentSetActivity>>,
}

/// 批量转交时的单个内容集请求。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContentSetRequest {
    activity: ContentSetActivity,
    key: ContentSetKey,
    lease: Duration,
}

impl ContentSetRequest {
    /// 由能力对象派生请求。
    pub fn new(
        activity: ContentSetActivity,
        content_set: &(impl CachedContentSet + ?Sized),
        lease: Duration,
    ) -> Result<Self, KeyError> {
        Ok(Self::for_key(activity, ContentSetKey::of(content_set)?, lease))
    }

    /// 以已构造好的键创建请求。
    pub fn for_key(activity: ContentSetActivity, key: ContentSetKey, lease: Duration) -> Self {
        Self {
            activity,
            key,
            lease,
        }
    }

    /// 请求的活动。
    pub fn activity(&self) -> ContentSetActivity {
        self.activity
    }

    /// 目标内容集键。
    pub fn key(&self) -> &ContentSetKey {
        &self.key
    }

    /// 请求的租约时长。
    pub fn lease(&self) -> Duration {
        self.lease
    }
}

/// 单条存活授权的诊断视图。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GrantSnapshot {
    /// 文本键。
    pub key: String,
    /// 占用的活动。
    pub activity: Activity,
    /// 剩余租约。
    pub remaining: Duration,
}

/// 账本的诊断快照，条目按键排序。
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LedgerSnapshot {
    /// 集合级授权。
    pub collections: Vec<GrantSnapshot>,
    /// 内容集级授权。
    pub content_sets: Vec<GrantSnapshot>,
}

impl ActivityLedger {
    /// 创建空账本。
    pub fn new() -> Self {
        Self::default()
    }

    /// 集合当前的活动；发现过期条目时将其删除。
    pub fn collection_activity(&mut self, key: &CollectionKey, now: Instant) -> CollectionActivity {
        match self.collections.get(key) {
            None => CollectionActivity::NoActivity,
            Some(entry) if entry.is_expired(now) => {
                trace!(
                    collection = %key,
                    activity = %entry.activity(),
                    "removing expired collection lease"
                );
                self.collections.remove(key);
                CollectionActivity::NoActivity
            }
            Some(entry) => entry.activity(),
        }
    }

    /// 内容集当前的活动；发现过期条目时将其删除。
    pub fn content_set_activity(&mut self, key: &ContentSetKey, now: Instant) -> ContentSetActivity {
        match self.content_sets.get(key) {
            None => ContentSetActivity::NoActivity,
            Some(entry) if entry.is_expired(now) => {
                trace!(
                    content_set = %key,
                    activity = %entry.activity(),
                    "removing expired content-set lease"
                );
                self.content_sets.remove(key);
                ContentSetActivity::NoActivity
            }
            Some(entry) => entry.activity(),
        }
    }

    /// 尝试在集合上启动 `kind`。拒绝时账本不变。
    pub fn try_start_collection(
        &mut self,
        kind: CollectionActivity,
        key: &CollectionKey,
        now: Instant,
        lease: Duration,
    ) -> bool {
        let current = self.collection_activity(key, now);
        if !collection_admits(kind, current) {
            debug!(
                collection = %key,
                current = %current,
                activity = %kind,
                "collection busy, activity denied"
            );
            return false;
        }
        self.collections
            .insert(key.clone(), LeaseEntry::granted(kind, now, lease));
        debug!(collection = %key, activity = %kind, ?lease, "started collection activity");
        true
    }

    /// 尝试在内容集上启动 `kind`。
    ///
    /// 依次检查：所属集合（集合级活动总是优先）、内容集自身、所有与之相关的存活内容集。
    /// 成功后安装内容集租约，并无条件地以同样的租约（重新）安装集合上的
    /// [`CollectionActivity::ContentSetActivity`] 标记。
    pub fn try_start_content_set(
        &mut self,
        kind: ContentSetActivity,
        key: &ContentSetKey,
        now: Instant,
        lease: Duration,
    ) -> bool {
        let owner = key.collection();
        let collection_current = self.collection_activity(owner, now);
        if !collection_admits(kind, collection_current) {
            debug!(
                collection = %owner,
                content_set = %key,
                current = %collection_current,
                activity = %kind,
                "collection busy, content-set activity denied"
            );
            return false;
        }

        let own = self.content_set_activity(key, now);
        if !content_set_admits(kind, own, Relation::Same) {
            debug!(
                content_set = %key,
                current = %own,
                activity = %kind,
                "content set busy, activity denied"
            );
            return false;
        }

        self.purge_expired_content_sets(now);
        let conflict = self.content_sets.iter().find_map(|(occupied, entry)| {
            let relation = occupied.relation_to(key);
            let related = !matches!(relation, Relation::None | Relation::Same);
            (related && !content_set_admits(kind, entry.activity(), relation))
                .then_some((occupied, entry.activity(), relation))
        });
        if let Some((occupied, current, relation)) = conflict {
            debug!(
                content_set = %key,
                occupied = %occupied,
                current = %current,
                relation = %relation,
                activity = %kind,
                "related content set busy, activity denied"
            );
            return false;
        }

        self.content_sets
            .insert(key.clone(), LeaseEntry::granted(kind, now, lease));
        self.collections.insert(
            owner.clone(),
            LeaseEntry::granted(CollectionActivity::ContentSetActivity, now, lease),
        );
        debug!(content_set = %key, activity = %kind, ?lease, "started content-set activity");
        true
    }

    /// 结束集合上的 `kind`；只有当前仍是 `kind` 时才删除。返回是否删除。
    pub fn finish_collection(
        &mut self,
        kind: CollectionActivity,
        key: &CollectionKey,
        now: Instant,
    ) -> bool {
        let current = self.collection_activity(key, now);
        if current != kind {
            trace!(
                collection = %key,
                current = %current,
                activity = %kind,
                "finish ignored, activity no longer owned"
            );
            return false;
        }
        let removed = self.collections.remove(key).is_some();
        if removed {
            debug!(collection = %key, activity = %kind, "finished collection activity");
        }
        removed
    }

    /// 结束内容集上的 `kind`；随后若所属集合已无存活的内容集租约，
    /// 清除仍为 `ContentSetActivity` 的集合标记。返回内容集条目是否被删除。
    pub fn finish_content_set(
        &mut self,
        kind: ContentSetActivity,
        key: &ContentSetKey,
        now: Instant,
    ) -> bool {
        let current = self.content_set_activity(key, now);
        let removed = if current == kind {
            let removed = self.content_sets.remove(key).is_some();
            if removed {
                debug!(content_set = %key, activity = %kind, "finished content-set activity");
            }
            removed
        } else {
            trace!(
                content_set = %key,
                current = %current,
                activity = %kind,
                "finish ignored, activity no longer owned"
            );
            false
        };
        self.release_marker_if_idle(key.collection(), now);
        removed
    }

    /// 将仍归属调用方的集合租约推后 `extension`。
    pub fn extend_collection(
        &mut self,
        kind: CollectionActivity,
        key: &CollectionKey,
        now: Instant,
        extension: Duration,
    ) -> bool {
        if self.collection_activity(key, now) != kind || !kind.is_active() {
            trace!(collection = %key, activity = %kind, "extend ignored, activity no longer owned");
            return false;
        }
        let Some(entry) = self.collections.get_mut(key) else {
            return false;
        };
        entry.extend(extension);
        debug!(collection = %key, activity = %kind, ?extension, "extended collection lease");
        true
    }

    /// 将仍归属调用方的内容集租约推后 `extension`，并同步推后集合标记。
    ///
    /// 若集合标记已先于内容集过期，则按内容集的剩余租约重新安装。
    pub fn extend_content_set(
        &mut self,
        kind: ContentSetActivity,
        key: &ContentSetKey,
        now: Instant,
        extension: Duration,
    ) -> bool {
        if self.content_set_activity(key, now) != kind || !kind.is_active() {
            trace!(content_set = %key, activity = %kind, "extend ignored, activity no longer owned");
            return false;
        }
        let Some(entry) = self.content_sets.get_mut(key) else {
            return false;
        };
        entry.extend(extension);
        let remaining = entry.remaining(now);

        let owner = key.collection();
        match self.collection_activity(owner, now) {
            CollectionActivity::ContentSetActivity => {
                if let Some(marker) = self.collections.get_mut(owner) {
                    marker.extend(extension);
                }
            }
            CollectionActivity::NoActivity => {
                self.collections.insert(
                    owner.clone(),
                    LeaseEntry::granted(CollectionActivity::ContentSetActivity, now, remaining),
                );
            }
            other => warn!(
                collection = %owner,
                current = %other,
                "content-set lease extended while collection holds a collection-level activity"
            ),
        }
        debug!(content_set = %key, activity = %kind, ?extension, "extended content-set lease");
        true
    }

    /// 就地把集合上仍归属调用方的 `held` 改为 `new`，租约从 `now` 起重新计算。
    ///
    /// 持有者改变自身授权的种类，不再经过准入矩阵；`ContentSetActivity` 标记由账本维护，
    /// 既不能被改写，也不能作为目标。
    pub fn change_collection(
        &mut self,
        held: CollectionActivity,
        new: CollectionActivity,
        key: &CollectionKey,
        now: Instant,
        lease: Duration,
    ) -> bool {
        let real = |kind: CollectionActivity| {
            kind.is_active() && kind != CollectionActivity::ContentSetActivity
        };
        let current = self.collection_activity(key, now);
        if current != held || !real(held) || !real(new) {
            trace!(
                collection = %key,
                current = %current,
                held = %held,
                activity = %new,
                "change ignored, activity no longer owned"
            );
            return false;
        }
        self.collections
            .insert(key.clone(), LeaseEntry::granted(new, now, lease));
        debug!(collection = %key, from = %held, activity = %new, ?lease, "changed collection activity");
        true
    }

    /// 就地把内容集上仍归属调用方的 `held` 改为 `new`，租约从 `now` 起重新计算；
    /// 集合标记至少延续到新的截止时间。
    pub fn change_content_set(
        &mut self,
        held: ContentSetActivity,
        new: ContentSetActivity,
        key: &ContentSetKey,
        now: Instant,
        lease: Duration,
    ) -> bool {
        let current = self.content_set_activity(key, now);
        if current != held || !held.is_active() || !new.is_active() {
            trace!(
                content_set = %key,
                current = %current,
                held = %held,
                activity = %new,
                "change ignored, activity no longer owned"
            );
            return false;
        }
        let entry = LeaseEntry::granted(new, now, lease);
        self.content_sets.insert(key.clone(), entry);

        let owner = key.collection();
        match self.collection_activity(owner, now) {
            CollectionActivity::ContentSetActivity | CollectionActivity::NoActivity => {
                let outlived = self
                    .collections
                    .get(owner)
                    .is_some_and(|marker| marker.deadline() >= entry.deadline());
                if !outlived {
                    self.collections.insert(
                        owner.clone(),
                        LeaseEntry::granted(CollectionActivity::ContentSetActivity, now, lease),
                    );
                }
            }
            other => warn!(
                collection = %owner,
                current = %other,
                "content-set activity changed while collection holds a collection-level activity"
            ),
        }
        debug!(content_set = %key, from = %held, activity = %new, ?lease, "changed content-set activity");
        true
    }

    /// 把集合上持有的 `held` 转交为一批内容集授权。
    ///
    /// - 集合当前必须恰好持有 `held`，且 `held` 是真实的集合级活动；否则不做任何事；
    /// - 先以 `handover_lease` 安装内容集标记，再逐个尝试请求，冲突或不属于该集合的请求被跳过；
    /// - 最后把标记的租约设为集合内最长的存活内容集租约，若一个都没有则清除标记。
    ///
    /// 返回成功授权的内容集键，顺序与请求一致。
    pub fn convert_to_content_sets(
        &mut self,
        held: CollectionActivity,
        collection: &CollectionKey,
        requests: &[ContentSetRequest],
        now: Instant,
        handover_lease: Duration,
    ) -> Vec<ContentSetKey> {
        let convertible = matches!(
            held,
            CollectionActivity::NewContentCrawl
                | CollectionActivity::TopLevelPoll
                | CollectionActivity::Treewalk
        );
        let current = self.collection_activity(collection, now);
        if !convertible || current != held {
            debug!(
                collection = %collection,
                current = %current,
                held = %held,
                "conversion refused, collection lease not held"
            );
            return Vec::new();
        }

        self.collections.insert(
            collection.clone(),
            LeaseEntry::granted(CollectionActivity::ContentSetActivity, now, handover_lease),
        );
        let mut granted = Vec::with_capacity(requests.len());
        for request in requests {
            if !request.key.belongs_to(collection) {
                debug!(
                    collection = %collection,
                    content_set = %request.key,
                    "conversion skipped content set of another collection"
                );
                continue;
            }
            if self.try_start_content_set(request.activity, &request.key, now, request.lease) {
                granted.push(request.key.clone());
            }
        }

        match self.longest_content_set_lease(collection, now) {
            Some(longest) => {
                self.collections.insert(
                    collection.clone(),
                    LeaseEntry::granted(CollectionActivity::ContentSetActivity, now, longest),
                );
            }
            None => {
                self.collections.remove(collection);
            }
        }
        debug!(
            collection = %collection,
            from = %held,
            granted = granted.len(),
            requested = requests.len(),
            "converted collection lease to content-set leases"
        );
        granted
    }

    /// 清空两张表。
    pub fn clear(&mut self) {
        self.collections.clear();
        self.content_sets.clear();
    }

    /// 剔除过期条目后生成诊断快照。
    pub fn snapshot(&mut self, now: Instant) -> LedgerSnapshot {
        self.collections.retain(|_, entry| !entry.is_expired(now));
        self.purge_expired_content_sets(now);

        let mut collections: Vec<_> = self
            .collections
            .iter()
            .map(|(key, entry)| GrantSnapshot {
                key: key.to_string(),
                activity: entry.activity().into(),
                remaining: entry.remaining(now),
            })
            .collect();
        let mut content_sets: Vec<_> = self
            .content_sets
            .iter()
            .map(|(key, entry)| GrantSnapshot {
                key: key.to_string(),
                activity: entry.activity().into(),
                remaining: entry.remaining(now),
            })
            .collect();
        collections.sort_by(|a, b| a.key.cmp(&b.key));
        content_sets.sort_by(|a, b| a.key.cmp(&b.key));
        LedgerSnapshot {
            collections,
            content_sets,
        }
    }

    /// 表中条目数（含尚未被发现的过期条目）。
    pub fn len(&self) -> usize {
        self.collections.len() + self.content_sets.len()
    }

    /// 两张表是否都为空。
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty() && self.content_sets.is_empty()
    }

    fn purge_expired_content_sets(&mut self, now: Instant) {
        self.content_sets.retain(|key, entry| {
            let expired = entry.is_expired(now);
            if expired {
                trace!(
                    content_set = %key,
                    activity = %entry.activity(),
                    "removing expired content-set lease"
                );
            }
            !expired
        });
    }

    fn longest_content_set_lease(&self, collection: &CollectionKey, now: Instant) -> Option<Duration> {
        self.content_sets
            .iter()
            .filter(|(key, entry)| key.belongs_to(collection) && !entry.is_expired(now))
            .map(|(_, entry)| entry.remaining(now))
            .max()
    }

    fn release_marker_if_idle(&mut self, collection: &CollectionKey, now: Instant) {
        self.purge_expired_content_sets(now);
        if self.content_sets.keys().any(|key| key.belongs_to(collection)) {
            return;
        }
        let current = self.collection_activity(collection, now);
        if current == CollectionActivity::ContentSetActivity {
            self.collections.remove(collection);
            debug!(
                collection = %collection,
                activity = %current,
                "finished content-set activity on collection"
            );
        } else if current.is_active() {
            trace!(
                collection = %collection,
                current = %current,
                "collection busy with another activity, marker left untouched"
            );
        }
    }
}
