//! # 键编码
//!
//! ## 外部格式
//! - 集合键：集合标识本身；
//! - 内容集键：`collection || "::" || url || "::" || qualifier`，限定符为空（整棵子树）、
//!   `[lower,upper]`（闭区间范围，任一端可空）或 `.`（单节点）。
//!
//! ## 转义
//! URL 来自外部，可能含 `::`（如 IPv6 主机 `http://[::1]/`）或以 `:` 结尾。编码时以 `\` 转义：
//! `\` 写作 `\\`，紧邻另一个 `:` 或位于段尾的 `:` 写作 `\:`；范围边界中的 `,` 写作 `\,`。
//! 普通 URL 的文本键因此保持原样，而任何键都能从文本无歧义地还原。
//! 集合标识由本系统分配，不得含 `::` 也不得以 `:` 结尾。
//!
//! ## 内部表示
//! 文本键只在边界上出现：构造或解析时一次性拆成 (集合, URL, 限定符) 三元组，
//! 之后的相等比较与关系判定都基于结构化字段，不再反复切片字符串。

mod capability;
mod relation;

use core::fmt::{self, Write as _};
use core::str::FromStr;
use std::sync::Arc;

pub use capability::{ArchivalCollection, CachedContentSet, CollectionRef, ContentSetRef};
pub use relation::Relation;

pub use crate::error::KeyError;

/// 键内各段之间的分隔符。
pub const SEPARATOR: &str = "::";

const SINGLE_NODE_MARKER: &str = ".";
const ESCAPE: char = '\\';

/// 集合键。
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CollectionKey(Arc<str>);

impl CollectionKey {
    /// 校验并构造集合键。
    pub fn new(collection_id: impl AsRef<str>) -> Result<Self, KeyError> {
        let id = collection_id.as_ref();
        if id.is_empty() {
            return Err(KeyError::EmptyCollectionId);
        }
        if id.contains(SEPARATOR) || id.ends_with(':') {
            return Err(KeyError::SeparatorInCollectionId {
                collection: id.to_owned(),
            });
        }
        Ok(Self(Arc::from(id)))
    }

    /// 由能力对象派生集合键。
    pub fn of(collection: &(impl ArchivalCollection + ?Sized)) -> Result<Self, KeyError> {
        Self::new(collection.collection_id())
    }

    /// 集合标识。
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 内容集的范围限定符。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Qualifier {
    /// 以 URL 为前缀的整棵子树。
    Subtree,
    /// 子树内的闭区间 `[lower, upper]`，缺省端表示不设限。
    Range {
        lower: Option<Arc<str>>,
        upper: Option<Arc<str>>,
    },
    /// 仅 URL 对应的单个节点，不递归。
    SingleNode,
}

impl Qualifier {
    /// 构造范围限定符；空字符串边界等同于不设限。
    pub fn range(lower: Option<&str>, upper: Option<&str>) -> Self {
        Qualifier::Range {
            lower: lower.filter(|bound| !bound.is_empty()).map(Arc::from),
            upper: upper.filter(|bound| !bound.is_empty()).map(Arc::from),
        }
    }

    fn normalized(self) -> Self {
        match self {
            Qualifier::Range { lower, upper } => Qualifier::range(lower.as_deref(), upper.as_deref()),
            other => other,
        }
    }

    fn parse(text: &str, key: &str) -> Result<Self, KeyError> {
        if text.is_empty() {
            return Ok(Qualifier::Subtree);
        }
        if text == SINGLE_NODE_MARKER {
            return Ok(Qualifier::SingleNode);
        }
        let malformed = || KeyError::MalformedQualifier {
            key: key.to_owned(),
            qualifier: text.to_owned(),
        };
        let inner = text
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(malformed)?;
        let (lower, upper) = split_unescaped(inner, ",").ok_or_else(malformed)?;
        let lower = unescape(lower, key)?;
        let upper = unescape(upper, key)?;
        Ok(Qualifier::range(Some(&lower), Some(&upper)))
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::Subtree => Ok(()),
            Qualifier::SingleNode => f.write_str(SINGLE_NODE_MARKER),
            Qualifier::Range { lower, upper } => {
                f.write_char('[')?;
                write_escaped_bound(f, lower.as_deref().unwrap_or_default())?;
                f.write_char(',')?;
                write_escaped_bound(f, upper.as_deref().unwrap_or_default())?;
                f.write_char(']')
            }
        }
    }
}

/// 结构化的内容集键。
///
/// 相等性与文本键逐字节相等一致：三段都相同才算同一个键。
/// 同一 URL 的不同范围限定符是不同的键，但它们之间的 [`Relation`] 为 `Same`。
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ContentSetKey {
    collection: CollectionKey,
    url: Arc<str>,
    qualifier: Qualifier,
}

impl ContentSetKey {
    /// 构造内容集键；URL 不受限制，空范围边界被归一为不设限。
    pub fn new(collection: CollectionKey, url: impl AsRef<str>, qualifier: Qualifier) -> Self {
        Self {
            collection,
            url: Arc::from(url.as_ref()),
            qualifier: qualifier.normalized(),
        }
    }

    /// 由能力对象派生内容集键。
    pub fn of(content_set: &(impl CachedContentSet + ?Sized)) -> Result<Self, KeyError> {
        let collection = CollectionKey::new(content_set.collection_id())?;
        Ok(Self::new(collection, content_set.url(), content_set.qualifier()))
    }

    /// 解析外部文本键。
    ///
    /// 集合标识止于第一个未转义的 `::`，URL 止于其后的下一个未转义 `::`，剩余部分为限定符。
    pub fn parse(text: &str) -> Result<Self, KeyError> {
        let missing = || KeyError::MissingSeparator {
            key: text.to_owned(),
        };
        let (collection, rest) = split_unescaped(text, SEPARATOR).ok_or_else(missing)?;
        let (url, qualifier) = split_unescaped(rest, SEPARATOR).ok_or_else(missing)?;
        let collection = CollectionKey::new(unescape(collection, text)?)?;
        let url = unescape(url, text)?;
        let qualifier = Qualifier::parse(qualifier, text)?;
        Ok(Self::new(collection, url, qualifier))
    }

    /// 所属集合。
    pub fn collection(&self) -> &CollectionKey {
        &self.collection
    }

    /// 内容集 URL。
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 范围限定符。
    pub fn qualifier(&self) -> &Qualifier {
        &self.qualifier
    }

    /// 是否属于给定集合。
    pub fn belongs_to(&self, collection: &CollectionKey) -> bool {
        &self.collection == collection
    }
}

impl fmt::Display for ContentSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped_segment(f, self.collection.as_str())?;
        f.write_str(SEPARATOR)?;
        write_escaped_segment(f, &self.url)?;
        write!(f, "{SEPARATOR}{}", self.qualifier)
    }
}

impl FromStr for ContentSetKey {
    type Err = KeyError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

/// 写出一段集合标识或 URL，使其不含未转义的 `::` 且不以未转义的 `:` 结尾。
fn write_escaped_segment(f: &mut fmt::Formatter<'_>, segment: &str) -> fmt::Result {
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => f.write_str("\\\\")?,
            ':' if matches!(chars.peek(), None | Some(':')) => f.write_str("\\:")?,
            _ => f.write_char(c)?,
        }
    }
    Ok(())
}

fn write_escaped_bound(f: &mut fmt::Formatter<'_>, bound: &str) -> fmt::Result {
    for c in bound.chars() {
        if matches!(c, ESCAPE | ',') {
            f.write_char(ESCAPE)?;
        }
        f.write_char(c)?;
    }
    Ok(())
}

/// 在第一个未转义的 `needle` 处切分。
fn split_unescaped<'a>(text: &'a str, needle: &str) -> Option<(&'a str, &'a str)> {
    let bytes = text.as_bytes();
    let mut at = 0;
    while at < bytes.len() {
        if bytes[at] == b'\\' {
            at += 2;
            continue;
        }
        if bytes[at..].starts_with(needle.as_bytes()) {
            return Some((&text[..at], &text[at + needle.len()..]));
        }
        at += 1;
    }
    None
}

fn unescape(segment: &str, key: &str) -> Result<String, KeyError> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            let escaped = chars.next().ok_or_else(|| KeyError::DanglingEscape {
                key: key.to_owned(),
            })?;
            out.push(escaped);
        } else {
            out.push(c);
        }
    }
    Ok(out)
}
