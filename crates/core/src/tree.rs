//! Idea trees, layer histories, and the branches they accumulate.
//!
//! Both are caller-owned: the engine receives one, returns an updated copy,
//! and keeps nothing between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TreeError;

/// One extracted attribute, tagged with the layer it was extracted for.
///
/// Identity is the `(label, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, alias = "layerId")]
    pub layer_id: String,
}

impl Branch {
    pub fn new(label: impl Into<String>, value: impl Into<String>, layer_id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            layer_id: layer_id.into(),
        }
    }

    pub fn same_key(&self, other: &Branch) -> bool {
        self.label == other.label && self.value == other.value
    }
}

/// An ordered, deduplicated sequence of branches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdeaTree {
    branches: Vec<Branch>,
}

impl IdeaTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Branch> {
        self.branches.iter()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn contains_key(&self, label: &str, value: &str) -> bool {
        self.branches.iter().any(|b| b.label == label && b.value == value)
    }

    /// Append `branch` unless its `(label, value)` is already present.
    pub fn push_unique(&mut self, branch: Branch) -> bool {
        if self.branches.iter().any(|b| b.same_key(&branch)) {
            return false;
        }
        self.branches.push(branch);
        true
    }

    pub fn retain<F: FnMut(&Branch) -> bool>(&mut self, keep: F) {
        self.branches.retain(keep);
    }

    /// Reject branches with an empty label, value or layer id, and any
    /// repeat of an earlier `(label, value)`.
    pub fn validate(&self) -> Result<(), TreeError> {
        for (index, branch) in self.branches.iter().enumerate() {
            let reason = if branch.label.trim().is_empty() {
                "missing label"
            } else if branch.value.trim().is_empty() {
                "missing value"
            } else if branch.layer_id.trim().is_empty() {
                "missing layer_id"
            } else if self.branches[..index].iter().any(|b| b.same_key(branch)) {
                "duplicate (label, value)"
            } else {
                continue;
            };
            return Err(TreeError::MalformedBranch {
                index,
                reason: reason.into(),
            });
        }
        Ok(())
    }

    pub fn into_branches(self) -> Vec<Branch> {
        self.branches
    }
}

/// Builds a tree *without* deduplication so callers can hand the engine
/// whatever they stored; `validate` and merging deal with the contents.
impl From<Vec<Branch>> for IdeaTree {
    fn from(branches: Vec<Branch>) -> Self {
        Self { branches }
    }
}

impl<'a> IntoIterator for &'a IdeaTree {
    type Item = &'a Branch;
    type IntoIter = std::slice::Iter<'a, Branch>;

    fn into_iter(self) -> Self::IntoIter {
        self.branches.iter()
    }
}

/// What happened at one layer of a templated refinement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerHistoryEntry {
    #[serde(alias = "layerId")]
    pub layer_id: String,

    /// The text submitted at this layer
    pub prompt: String,

    #[serde(default, alias = "refinedPrompt")]
    pub refined_prompt: String,

    #[serde(default)]
    pub responses: Vec<String>,

    pub timestamp: DateTime<Utc>,
}

/// Append-only sequence of [`LayerHistoryEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerHistory {
    entries: Vec<LayerHistoryEntry>,
}

impl LayerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[LayerHistoryEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: LayerHistoryEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reject entries without a layer id.
    pub fn validate(&self) -> Result<(), TreeError> {
        match self.entries.iter().position(|e| e.layer_id.trim().is_empty()) {
            Some(index) => Err(TreeError::MalformedBranch {
                index,
                reason: "history entry missing layer_id".into(),
            }),
            None => Ok(()),
        }
    }
}

impl From<Vec<LayerHistoryEntry>> for LayerHistory {
    fn from(entries: Vec<LayerHistoryEntry>) -> Self {
        Self { entries }
    }
}

/// Session progress handed to and returned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Progress {
    /// Branch tree (the fixed altitude flow)
    Tree(IdeaTree),
    /// Layer history (templated flows)
    History(LayerHistory),
}

impl Progress {
    pub fn is_empty(&self) -> bool {
        match self {
            Progress::Tree(tree) => tree.is_empty(),
            Progress::History(history) => history.is_empty(),
        }
    }

    /// Layer ids represented in this progress, in insertion order.
    pub fn layer_ids(&self) -> Vec<&str> {
        match self {
            Progress::Tree(tree) => tree.iter().map(|b| b.layer_id.as_str()).collect(),
            Progress::History(history) => history.entries().iter().map(|e| e.layer_id.as_str()).collect(),
        }
    }

    pub fn validate(&self) -> Result<(), TreeError> {
        match self {
            Progress::Tree(tree) => tree.validate(),
            Progress::History(history) => history.validate(),
        }
    }

    pub fn tree(&self) -> Option<&IdeaTree> {
        match self {
            Progress::Tree(tree) => Some(tree),
            Progress::History(_) => None,
        }
    }

    pub fn history(&self) -> Option<&LayerHistory> {
        match self {
            Progress::History(history) => Some(history),
            Progress::Tree(_) => None,
        }
    }
}
