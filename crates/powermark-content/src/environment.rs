//! Per-compile side channel filled while rendering.

use std::collections::BTreeMap;

/// Category holding the bodies of style-collection fences.
pub const STYLE_CATEGORY: &str = "styles";

/// Category name to ordered fragments, gathered during one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderEnvironment {
    entries: BTreeMap<String, Vec<String>>,
}

impl RenderEnvironment {
    /// An empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `content` to `category`.
    pub fn push(&mut self, category: &str, content: impl Into<String>) {
        self.entries
            .entry(category.to_string())
            .or_default()
            .push(content.into());
    }

    /// Fragments collected under `category`, in insertion order.
    pub fn get(&self, category: &str) -> &[String] {
        self.entries
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Collected style fragments.
    pub fn styles(&self) -> &[String] {
        self.get(STYLE_CATEGORY)
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}
