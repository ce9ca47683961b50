//! # 活动种类
//!
//! ## 定位
//! - 集合级与内容集级活动是两个互不相交的枚举族，跨族比较在类型层面即被禁止；
//! - 集合级准入检查同时接受两族请求（内容集活动也要先过集合这一关），因此另设 [`Activity`]
//!   作为两族的并集，仅用于准入与诊断。
//!
//! ## 约束
//! - [`CollectionActivity::ContentSetActivity`] 是合成标记，表示“集合内有内容集活动正在进行”，
//!   调用方不应直接申请；
//! - `NoActivity` 在两族中都存在，与“租约缺席”同义。

use core::fmt;

/// 集合（Archival Unit）级活动。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CollectionActivity {
    /// 无活动。
    NoActivity,
    /// 新内容采集：独占整个集合。
    NewContentCrawl,
    /// 顶层完整性投票。
    TopLevelPoll,
    /// 维护性树遍历：独占整个集合。
    Treewalk,
    /// 合成标记：集合内至少有一个内容集活动。
    ///
    /// 阻止新的集合级活动，但不阻止其他内容集活动。
    ContentSetActivity,
}

/// 内容集（CachedUrlSet）级活动。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContentSetActivity {
    /// 无活动。
    NoActivity,
    /// 修复采集。
    RepairCrawl,
    /// 后台采集。
    BackgroundCrawl,
    /// 内容投票。
    StandardContentPoll,
    /// 名称投票。
    StandardNamePoll,
}

/// 两族活动的并集，供集合级准入与诊断标签使用。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Activity {
    /// 集合级活动。
    Collection(CollectionActivity),
    /// 内容集级活动。
    ContentSet(ContentSetActivity),
}

impl CollectionActivity {
    /// 人类可读的诊断标签。
    pub const fn label(self) -> &'static str {
        match self {
            CollectionActivity::NoActivity => "No Activity",
            CollectionActivity::NewContentCrawl => "New Content Crawl",
            CollectionActivity::TopLevelPoll => "Top Level Poll",
            CollectionActivity::Treewalk => "Treewalk",
            CollectionActivity::ContentSetActivity => "Content Set Activity",
        }
    }

    /// 是否代表一项真实占用（非 `NoActivity`）。
    pub const fn is_active(self) -> bool {
        !matches!(self, CollectionActivity::NoActivity)
    }
}

impl ContentSetActivity {
    /// 人类可读的诊断标签。
    pub const fn label(self) -> &'static str {
        match self {
            ContentSetActivity::NoActivity => "No Activity",
            ContentSetActivity::RepairCrawl => "Repair Crawl",
            ContentSetActivity::BackgroundCrawl => "Background Crawl",
            ContentSetActivity::StandardContentPoll => "Content Poll",
            ContentSetActivity::StandardNamePoll => "Name Poll",
        }
    }

    /// 是否为采集类活动（修复或后台）。
    pub const fn is_crawl(self) -> bool {
        matches!(
            self,
            ContentSetActivity::RepairCrawl | ContentSetActivity::BackgroundCrawl
        )
    }

    /// 是否代表一项真实占用（非 `NoActivity`）。
    pub const fn is_active(self) -> bool {
        !matches!(self, ContentSetActivity::NoActivity)
    }
}

impl Activity {
    /// 人类可读的诊断标签。
    pub const fn label(self) -> &'static str {
        match self {
            Activity::Collection(kind) => kind.label(),
            Activity::ContentSet(kind) => kind.label(),
        }
    }

    /// 是否属于内容集族。
    ///
    /// 两族的 `NoActivity` 都视为内容集族成员：集合处于内容集活动期间，
    /// “什么也不做”的请求总是被放行。
    pub const fn is_content_set_family(self) -> bool {
        matches!(
            self,
            Activity::ContentSet(_) | Activity::Collection(CollectionActivity::NoActivity)
        )
    }
}

impl From<CollectionActivity> for Activity {
    fn from(kind: CollectionActivity) -> Self {
        Activity::Collection(kind)
    }
}

impl From<ContentSetActivity> for Activity {
    fn from(kind: ContentSetActivity) -> Self {
        Activity::ContentSet(kind)
    }
}

impl fmt::Display for CollectionActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for ContentSetActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 返回任意一族活动的诊断标签。
///
/// ```rust
/// use vigil_regulator::{CollectionActivity, ContentSetActivity, describe};
///
/// assert_eq!(describe(CollectionActivity::Treewalk), "Treewalk");
/// assert_eq!(describe(ContentSetActivity::StandardNamePoll), "Name Poll");
/// ```
pub fn describe(kind: impl Into<Activity>) -> &'static str {
    kind.into().label()
}
