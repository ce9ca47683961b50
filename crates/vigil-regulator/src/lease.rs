//! # 租约条目
//!
//! 一条租约 = (活动种类, 截止时间)。当 `now >= deadline` 时条目视为缺席，缺席等价于 `NoActivity`。
//! 过期只在查询路径上被发现并清除，没有后台清扫线程；长期无人访问的条目会滞留在内存中，
//! 但任何准入决策在信任条目前都会重新校验过期。

use std::time::{Duration, Instant};

/// 租约或续期长到无法表示时采用的上限（约 136 年）。
const FAR_FUTURE: Duration = Duration::from_secs(u32::MAX as u64);

/// 带截止时间的授权记录。
///
/// `A` 为活动族：集合表存放 [`CollectionActivity`](crate::CollectionActivity)，
/// 内容集表存放 [`ContentSetActivity`](crate::ContentSetActivity)。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LeaseEntry<A> {
    activity: A,
    deadline: Instant,
}

impl<A: Copy> LeaseEntry<A> {
    /// 以 `granted_at + lease` 为截止时间创建租约；溢出时截断到可表示的远期时间点。
    pub fn granted(activity: A, granted_at: Instant, lease: Duration) -> Self {
        Self {
            activity,
            deadline: saturating_deadline(granted_at, lease),
        }
    }

    /// 租约所代表的活动。
    pub fn activity(&self) -> A {
        self.activity
    }

    /// 截止时间。
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// `now >= deadline` 即过期。
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// 距截止时间的剩余时长，已过期时为零。
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// 将截止时间推后 `extension`，溢出时同样截断。
    pub fn extend(&mut self, extension: Duration) {
        self.deadline = saturating_deadline(self.deadline, extension);
    }
}

fn saturating_deadline(from: Instant, lease: Duration) -> Instant {
    from.checked_add(lease)
        .or_else(|| from.checked_add(FAR_FUTURE.min(lease)))
        .unwrap_or(from)
}
