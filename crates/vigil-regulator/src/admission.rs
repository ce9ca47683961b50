//! # 准入矩阵
//!
//! 两个纯函数：给定“当前占用”与“请求”，回答是否兼容。它们不读时钟、不碰账本，
//! 账本负责先剔除过期条目，再把存活条目交给这里裁决。
//!
//! ## 两阶段检查
//! 顶层投票期间，集合级矩阵会放行内容投票，真正的兼容性留给内容集级矩阵逐个裁决。
//! 若把两阶段合并成一张表，顶层投票期间的合法内容投票会在集合层被误拒。

use crate::activity::{Activity, CollectionActivity, ContentSetActivity};
use crate::key::Relation;

/// 集合级矩阵：集合当前处于 `current` 时，`requested` 能否启动。
///
/// | current | 规则 |
/// |---|---|
/// | `NoActivity` | 全部放行 |
/// | `NewContentCrawl`、`Treewalk` | 全部拒绝 |
/// | `TopLevelPoll` | 仅放行 `TopLevelPoll` 与内容集族的 `StandardContentPoll` |
/// | `ContentSetActivity` | 仅放行内容集族（含 `NoActivity`），拒绝一切集合级活动 |
pub fn collection_admits(requested: impl Into<Activity>, current: CollectionActivity) -> bool {
    let requested = requested.into();
    match current {
        CollectionActivity::NoActivity => true,
        CollectionActivity::NewContentCrawl | CollectionActivity::Treewalk => false,
        CollectionActivity::TopLevelPoll => matches!(
            requested,
            Activity::Collection(CollectionActivity::TopLevelPoll)
                | Activity::ContentSet(ContentSetActivity::StandardContentPoll)
        ),
        CollectionActivity::ContentSetActivity => requested.is_content_set_family(),
    }
}

/// 内容集级矩阵：已被 `current` 占用的内容集与请求节点之间为 `relation` 时，
/// `requested` 能否启动。
///
/// `relation` 是 **被占用节点相对于请求节点** 的位置
/// （即 `occupied.relation_to(&requested)`）。
///
/// | current | Same | Parent | Child |
/// |---|---|---|---|
/// | 采集（后台/修复） | 拒绝 | 全部放行 | 仅采集 |
/// | `StandardContentPoll` | 仅名称投票或修复采集 | 拒绝 | 仅采集 |
/// | `StandardNamePoll` | 拒绝 | 仅内容投票 | 仅采集 |
/// | `NoActivity` | 放行 | 放行 | 放行 |
///
/// `Relation::None` 一律放行。
pub fn content_set_admits(
    requested: ContentSetActivity,
    current: ContentSetActivity,
    relation: Relation,
) -> bool {
    use crate::activity::ContentSetActivity as Cs;

    if relation == Relation::None {
        return true;
    }
    match current {
        Cs::NoActivity => true,
        Cs::BackgroundCrawl | Cs::RepairCrawl => match relation {
            Relation::Same => false,
            Relation::Parent => true,
            Relation::Child | Relation::None => requested.is_crawl(),
        },
        Cs::StandardContentPoll => match relation {
            Relation::Same => matches!(requested, Cs::StandardNamePoll | Cs::RepairCrawl),
            Relation::Parent => false,
            Relation::Child | Relation::None => requested.is_crawl(),
        },
        Cs::StandardNamePoll => match relation {
            Relation::Same => false,
            Relation::Parent => requested == Cs::StandardContentPoll,
            Relation::Child | Relation::None => requested.is_crawl(),
        },
    }
}
