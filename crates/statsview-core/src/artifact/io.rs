use std::path::{Path, PathBuf};

use crate::artifact::{parse_artifact, parse_node};
use crate::error::StatsError;
use crate::model::{StatsNode, StatsTree};

/// Location of the statistics script inside a report directory.
const STATS_JS_RELATIVE: [&str; 2] = ["js", "stats.js"];

/// Map a report directory to its `js/stats.js`; file paths pass through.
pub fn resolve_artifact_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_dir() {
        STATS_JS_RELATIVE
            .iter()
            .fold(path.to_path_buf(), |acc, part| acc.join(part))
    } else {
        path.to_path_buf()
    }
}

/// Read a statistics tree from disk and validate it.
///
/// `path` may be a `stats.js` script, a JSON file, or a report directory
/// containing `js/stats.js`.
pub fn load_tree(path: impl AsRef<Path>) -> Result<StatsTree, StatsError> {
    let file = resolve_artifact_path(path);
    tracing::debug!(path = %file.display(), "reading stats artifact");
    let content = std::fs::read_to_string(&file)?;
    let tree = parse_artifact(&content)?;
    tracing::info!(
        path = %file.display(),
        requests = tree.request_count(),
        "loaded stats tree"
    );
    Ok(tree)
}

/// Read and decode an artifact without validating it.
pub fn read_node(path: impl AsRef<Path>) -> Result<StatsNode, StatsError> {
    let file = resolve_artifact_path(path);
    let content = std::fs::read_to_string(&file)?;
    parse_node(&content)
}

/// Write a [`StatsTree`] to disk as pretty-printed JSON.
pub fn write_tree(tree: &StatsTree, path: impl AsRef<Path>) -> Result<(), StatsError> {
    let content = serde_json::to_string_pretty(tree)?;
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
