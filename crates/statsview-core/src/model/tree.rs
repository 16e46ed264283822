use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::model::node::{NodeKind, StatsNode, Walk};
use crate::model::validation::validate_root;

/// A complete, validated statistics summary for one test run.
///
/// The only ways to obtain one are [`StatsTree::try_new`] and
/// deserialization, and both run the validator, so a `StatsTree` in hand is
/// always internally consistent. There is no mutation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "StatsNode", try_from = "StatsNode")]
pub struct StatsTree {
    root: StatsNode,
}

impl StatsTree {
    /// Validate `root` and wrap it. Every failure is logged; the returned
    /// error carries the first one.
    pub fn try_new(root: StatsNode) -> Result<Self, StatsError> {
        let errors = validate_root(&root);
        if errors.is_empty() {
            return Ok(Self { root });
        }
        for err in &errors {
            tracing::warn!("{err}");
        }
        let more = errors.len() - 1;
        let first = match &errors[0] {
            StatsError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        let message = if more > 0 {
            format!("{first} (and {more} more)")
        } else {
            first
        };
        Err(StatsError::Validation(message))
    }

    pub fn root(&self) -> &StatsNode {
        &self.root
    }

    /// Look up any node, the root included, by `pathFormatted`.
    pub fn find(&self, path_id: &str) -> Option<&StatsNode> {
        self.root.find(path_id)
    }

    /// Like [`find`](Self::find) but reports a missing id as an error.
    pub fn node(&self, path_id: &str) -> Result<&StatsNode, StatsError> {
        self.find(path_id)
            .ok_or_else(|| StatsError::NodeNotFound(path_id.to_string()))
    }

    /// All nodes in pre-order, root first.
    pub fn nodes(&self) -> Walk<'_> {
        self.root.walk()
    }

    /// Number of REQUEST nodes anywhere in the tree.
    pub fn request_count(&self) -> usize {
        self.nodes().filter(|n| n.kind == NodeKind::Request).count()
    }

    pub fn into_root(self) -> StatsNode {
        self.root
    }
}

impl TryFrom<StatsNode> for StatsTree {
    type Error = StatsError;

    fn try_from(root: StatsNode) -> Result<Self, Self::Error> {
        Self::try_new(root)
    }
}

impl From<StatsTree> for StatsNode {
    fn from(tree: StatsTree) -> Self {
        tree.root
    }
}
