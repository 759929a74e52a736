//! Per-element parsing directives.
//!
//! [`ParseInfo`] maps XML tag names to [`ElementInfo`] entries. Two extra
//! entries apply when no explicit entry answers a question: `common`, which
//! backs every element, and `def`, which backs elements without an explicit
//! entry. [`ParseInfo::resolve`] folds the three into a
//! [`ResolvedElementInfo`] field by field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How child elements are collected under the descendants label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescendantsBy {
    /// One child per identifying attribute value.
    Index,
    /// Children sharing an identifying attribute value are gathered into an array.
    Group,
}

/// Descendant-merge policy of an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescendantsInfo {
    /// Keyed collection mode; `None` keeps children as an ordered array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<DescendantsBy>,
    /// Attribute used as the key. Falls back to the child's own `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Fail when two children share a key (index mode only).
    pub throw_if_collision: bool,
    /// Fail when a child has no identifying attribute.
    pub throw_if_missing: bool,
}

/// Descriptive info about an XML tag encountered during conversion.
///
/// # Examples
///
/// ```
/// use dyncli_core::{DescendantsBy, ElementInfo};
///
/// let info = ElementInfo::identified_by("name")
///     .with_descendants(DescendantsBy::Index, "name")
///     .with_discards(&["inherits"]);
///
/// assert_eq!(info.id.as_deref(), Some("name"));
/// assert!(info.descendants.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementInfo {
    /// Identifying attribute of the element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Attribute naming same-tag siblings this element inherits from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurse: Option<String>,
    /// Attribute names and child tags dropped from the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discards: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descendants: Option<DescendantsInfo>,
}

impl ElementInfo {
    /// Creates an entry with an identifying attribute.
    pub fn identified_by(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    /// Sets the inheritance attribute.
    pub fn with_recurse(mut self, attribute: &str) -> Self {
        self.recurse = Some(attribute.to_string());
        self
    }

    /// Sets the discard list.
    pub fn with_discards(mut self, discards: &[&str]) -> Self {
        self.discards = Some(discards.iter().map(|d| d.to_string()).collect());
        self
    }

    /// Collects children by the given attribute.
    pub fn with_descendants(mut self, by: DescendantsBy, id: &str) -> Self {
        let descendants = self.descendants.get_or_insert_with(DescendantsInfo::default);
        descendants.by = Some(by);
        descendants.id = Some(id.to_string());
        self
    }

    /// Sets the collision and missing-id policy.
    pub fn throwing(mut self, if_collision: bool, if_missing: bool) -> Self {
        let descendants = self.descendants.get_or_insert_with(DescendantsInfo::default);
        descendants.throw_if_collision = if_collision;
        descendants.throw_if_missing = if_missing;
        self
    }
}

/// Collation of [`ElementInfo`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseInfo {
    pub elements: BTreeMap<String, ElementInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common: Option<ElementInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub def: Option<ElementInfo>,
}

/// Effective directives for one tag, borrowed from a [`ParseInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedElementInfo<'a> {
    pub id: Option<&'a str>,
    pub recurse: Option<&'a str>,
    pub discards: &'a [String],
    pub descendants: Option<&'a DescendantsInfo>,
}

impl ResolvedElementInfo<'_> {
    /// Returns `true` if `name` is an attribute or tag to drop.
    pub fn discards(&self, name: &str) -> bool {
        self.discards.iter().any(|d| d == name)
    }

    /// Attribute used to key descendants, if keyed collection is enabled.
    pub fn descendants_id(&self) -> Option<&str> {
        self.descendants.and_then(|d| d.id.as_deref())
    }
}

impl ParseInfo {
    /// Adds or replaces the entry for `tag`.
    pub fn with_element(mut self, tag: &str, info: ElementInfo) -> Self {
        self.elements.insert(tag.to_string(), info);
        self
    }

    pub fn with_common(mut self, info: ElementInfo) -> Self {
        self.common = Some(info);
        self
    }

    pub fn with_def(mut self, info: ElementInfo) -> Self {
        self.def = Some(info);
        self
    }

    /// Resolves the directives for `tag`.
    ///
    /// Each field is looked up in the explicit entry, then `common`, then
    /// `def`. `def` only takes part when `tag` has no explicit entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use dyncli_core::{ElementInfo, ParseInfo};
    ///
    /// let info = ParseInfo::default()
    ///     .with_element("Command", ElementInfo::identified_by("name"))
    ///     .with_common(ElementInfo::default().with_discards(&["abstract"]))
    ///     .with_def(ElementInfo::identified_by("id"));
    ///
    /// let command = info.resolve("Command");
    /// assert_eq!(command.id, Some("name"));
    /// assert!(command.discards("abstract"));
    ///
    /// let other = info.resolve("Other");
    /// assert_eq!(other.id, Some("id"));
    /// ```
    pub fn resolve(&self, tag: &str) -> ResolvedElementInfo<'_> {
        let explicit = self.elements.get(tag);
        let common = self.common.as_ref();
        let def = if explicit.is_none() {
            self.def.as_ref()
        } else {
            None
        };

        let chain: Vec<&ElementInfo> = [explicit, common, def].into_iter().flatten().collect();

        ResolvedElementInfo {
            id: chain.iter().copied().find_map(|info| info.id.as_deref()),
            recurse: chain.iter().copied().find_map(|info| info.recurse.as_deref()),
            discards: chain
                .iter()
                .copied()
                .find_map(|info| info.discards.as_deref())
                .unwrap_or(&[]),
            descendants: chain
                .iter()
                .copied()
                .find_map(|info| info.descendants.as_ref()),
        }
    }
}
