//! # 协作方能力
//!
//! 采集、投票与树遍历引擎只需暴露少量标识信息即可接入控制器：
//! 集合提供稳定标识与显示名，内容集提供所属集合、URL 与范围限定符。
//! 控制器从不触碰内容本身。

use std::sync::Arc;

use super::Qualifier;

/// 集合（Archival Unit）能力。
pub trait ArchivalCollection {
    /// 稳定且唯一的集合标识。
    fn collection_id(&self) -> &str;

    /// 显示名，仅用于诊断日志；默认与标识相同。
    fn display_name(&self) -> &str {
        self.collection_id()
    }
}

/// 内容集（CachedUrlSet）能力。
pub trait CachedContentSet {
    /// 所属集合标识。
    fn collection_id(&self) -> &str;

    /// 内容集 URL。
    fn url(&self) -> &str;

    /// 范围限定符。
    fn qualifier(&self) -> Qualifier;
}

/// 最小集合描述，便于调用方与测试无需自带类型即可使用控制器。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CollectionRef {
    id: Arc<str>,
    name: Arc<str>,
}

impl CollectionRef {
    /// 以标识兼作显示名。
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        let id = id.into();
        Self {
            name: Arc::clone(&id),
            id,
        }
    }

    /// 指定显示名。
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }
}

impl ArchivalCollection for CollectionRef {
    fn collection_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// 最小内容集描述。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ContentSetRef {
    collection_id: Arc<str>,
    url: Arc<str>,
    qualifier: Qualifier,
}

impl ContentSetRef {
    /// 通用构造。
    pub fn new(
        collection_id: impl Into<Arc<str>>,
        url: impl Into<Arc<str>>,
        qualifier: Qualifier,
    ) -> Self {
        Self {
            collection_id: collection_id.into(),
            url: url.into(),
            qualifier,
        }
    }

    /// URL 下的整棵子树。
    pub fn subtree(collection_id: impl Into<Arc<str>>, url: impl Into<Arc<str>>) -> Self {
        Self::new(collection_id, url, Qualifier::Subtree)
    }

    /// URL 下 `[lower, upper]` 闭区间内的子集。
    pub fn range(
        collection_id: impl Into<Arc<str>>,
        url: impl Into<Arc<str>>,
        lower: Option<&str>,
        upper: Option<&str>,
    ) -> Self {
        Self::new(collection_id, url, Qualifier::range(lower, upper))
    }

    /// 仅 URL 对应的单个节点。
    pub fn single_node(collection_id: impl Into<Arc<str>>, url: impl Into<Arc<str>>) -> Self {
        Self::new(collection_id, url, Qualifier::SingleNode)
    }
}

impl CachedContentSet for ContentSetRef {
    fn collection_id(&self) -> &str {
        &self.collection_id
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn qualifier(&self) -> Qualifier {
        self.qualifier.clone()
    }
}
