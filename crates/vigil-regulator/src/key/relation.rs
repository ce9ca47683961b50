//! # 内容集结构关系
//!
//! 关系只看 (集合, URL) 两段，限定符被剥离：同一 URL 的整树、范围与单节点变体彼此为 `Same`，
//! 嵌套 URL 的范围变体仍然是父子关系，而不是无关。
//!
//! URL 比较时在末尾补 `/` 再做前缀判定，确保 `/test` 不会被当成 `/test2` 的祖先。

use core::fmt;

use super::ContentSetKey;

/// 两个内容集之间的结构关系。
///
/// 方向约定：`a.relation_to(&b)` 描述 **`a` 相对于 `b`** 的位置。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Relation {
    /// 同一节点（限定符可以不同）。
    Same,
    /// `a` 是 `b` 的祖先。
    Parent,
    /// `a` 是 `b` 的后代。
    Child,
    /// 无关：不同集合，或 URL 互不为前缀。
    None,
}

impl Relation {
    /// 诊断标签。
    pub const fn label(self) -> &'static str {
        match self {
            Relation::Same => "Same",
            Relation::Parent => "Parent",
            Relation::Child => "Child",
            Relation::None => "No relation",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ContentSetKey {
    /// 计算 `self` 相对于 `other` 的结构关系。
    pub fn relation_to(&self, other: &ContentSetKey) -> Relation {
        if self.collection() != other.collection() {
            return Relation::None;
        }
        let (mine, theirs) = (self.url(), other.url());
        if mine == theirs {
            Relation::Same
        } else if is_path_ancestor(mine, theirs) {
            Relation::Parent
        } else if is_path_ancestor(theirs, mine) {
            Relation::Child
        } else {
            Relation::None
        }
    }
}

/// `descendant + "/"` 以 `ancestor + "/"` 为真前缀。
fn is_path_ancestor(ancestor: &str, descendant: &str) -> bool {
    descendant.len() > ancestor.len()
        && descendant.starts_with(ancestor)
        && descendant.as_bytes()[ancestor.len()] == b'/'
}
