pub mod io;
pub mod js;

use crate::error::StatsError;
use crate::model::{StatsNode, StatsTree};

pub use io::{load_tree, read_node, resolve_artifact_path, write_tree};

/// The two encodings the producer writes a statistics tree in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// Plain JSON, as in `global_stats.json`-style exports and our own output.
    Json,
    /// The `js/stats.js` script: a JavaScript object literal assignment.
    StatsJs,
}

impl ArtifactFormat {
    /// A document starting with `{` is JSON; anything else is treated as script.
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            ArtifactFormat::Json
        } else {
            ArtifactFormat::StatsJs
        }
    }
}

/// Parse a JSON tree and validate it.
pub fn parse_json(text: &str) -> Result<StatsTree, StatsError> {
    let root: StatsNode = serde_json::from_str(text)?;
    StatsTree::try_new(root)
}

/// Parse a `stats.js` script and validate the tree it carries.
pub fn parse_stats_js(text: &str) -> Result<StatsTree, StatsError> {
    let json = js::object_literal_to_json(text)?;
    let root: StatsNode = serde_json::from_str(&json)?;
    StatsTree::try_new(root)
}

/// Decode either encoding without validating, for callers that want to
/// report every inconsistency rather than stop at the first.
pub fn parse_node(text: &str) -> Result<StatsNode, StatsError> {
    let format = ArtifactFormat::detect(text);
    tracing::debug!(?format, "parsing stats artifact");
    let root = match format {
        ArtifactFormat::Json => serde_json::from_str(text)?,
        ArtifactFormat::StatsJs => serde_json::from_str(&js::object_literal_to_json(text)?)?,
    };
    Ok(root)
}

/// Parse either encoding, picking the parser with [`ArtifactFormat::detect`],
/// and validate the result.
pub fn parse_artifact(text: &str) -> Result<StatsTree, StatsError> {
    StatsTree::try_new(parse_node(text)?)
}
