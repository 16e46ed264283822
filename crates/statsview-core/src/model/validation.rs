use crate::error::StatsError;
use crate::model::node::{NodeKind, StatsNode};

/// Allowed drift between bucket percentages and 100, per bucket.
const PERCENTAGE_TOLERANCE_PER_BUCKET: u32 = 1;

/// Validate a tree rooted at `root` and return every failure found.
///
/// An empty `Vec` means the tree is consistent.
pub fn validate_root(root: &StatsNode) -> Vec<StatsError> {
    let mut errors = Vec::new();

    if root.kind != NodeKind::Group {
        errors.push(StatsError::Validation(format!(
            "Root node '{}' must be a GROUP (got {})",
            root.name, root.kind
        )));
    }

    errors.extend(validate_node(root));
    errors
}

/// Validate one node and, recursively, its children.
pub fn validate_node(node: &StatsNode) -> Vec<StatsError> {
    let mut errors = Vec::new();
    let label = if node.path.is_empty() { &node.name } else { &node.path };

    if node.name.trim().is_empty() {
        errors.push(StatsError::Validation(format!(
            "Node '{}': name must not be empty",
            node.path_id
        )));
    }

    if node.stats.name != node.name {
        errors.push(StatsError::Validation(format!(
            "Node '{}': stats name '{}' does not match node name",
            label, node.stats.name
        )));
    }

    errors.extend(validate_counts(label, node));

    if node.kind == NodeKind::Request && !node.contents.is_empty() {
        errors.push(StatsError::Validation(format!(
            "Node '{}': REQUEST nodes cannot have children",
            label
        )));
    }

    for (key, child) in node.contents.iter() {
        if key != child.path_id {
            errors.push(StatsError::Validation(format!(
                "Node '{}': contents key '{}' does not match child pathFormatted '{}'",
                label, key, child.path_id
            )));
        }
        errors.extend(validate_node(child));
    }

    errors
}

fn validate_counts(label: &str, node: &StatsNode) -> Vec<StatsError> {
    let mut errors = Vec::new();
    let requests = &node.stats.number_of_requests;

    let (total, ok, ko) = match (
        requests.total.as_count(),
        requests.ok.as_count(),
        requests.ko.as_count(),
    ) {
        (Some(t), Some(o), Some(k)) => (t, o, k),
        _ => {
            errors.push(StatsError::Validation(format!(
                "Node '{}': numberOfRequests must be non-negative integers (got {}/{}/{})",
                label, requests.total, requests.ok, requests.ko
            )));
            return errors;
        }
    };

    if ok.checked_add(ko) != Some(total) {
        errors.push(StatsError::Validation(format!(
            "Node '{}': numberOfRequests total {} != ok {} + ko {}",
            label, total, ok, ko
        )));
    }

    let buckets = node.stats.buckets();

    match buckets.iter().try_fold(0u64, |acc, b| acc.checked_add(b.count)) {
        Some(bucket_sum) if bucket_sum != total => {
            errors.push(StatsError::Validation(format!(
                "Node '{}': bucket counts sum to {} but numberOfRequests total is {}",
                label, bucket_sum, total
            )));
        }
        Some(_) => {}
        None => {
            errors.push(StatsError::Validation(format!(
                "Node '{}': bucket counts overflow when summed (numberOfRequests total is {})",
                label, total
            )));
        }
    }

    if node.stats.failed.count != ko {
        errors.push(StatsError::Validation(format!(
            "Node '{}': failed bucket count {} != numberOfRequests ko {}",
            label, node.stats.failed.count, ko
        )));
    }

    for bucket in buckets {
        if bucket.percentage > 100 {
            errors.push(StatsError::Validation(format!(
                "Node '{}': bucket '{}' percentage {} is above 100",
                label, bucket.name, bucket.percentage
            )));
        }
    }

    let pct_sum: u64 = buckets.iter().map(|b| u64::from(b.percentage)).sum();
    if total == 0 {
        if pct_sum != 0 {
            errors.push(StatsError::Validation(format!(
                "Node '{}': bucket percentages must be 0 when there are no requests",
                label
            )));
        }
    } else {
        let tolerance = u64::from(PERCENTAGE_TOLERANCE_PER_BUCKET) * buckets.len() as u64;
        if pct_sum.abs_diff(100) > tolerance {
            errors.push(StatsError::Validation(format!(
                "Node '{}': bucket percentages sum to {} (expected 100 ± {})",
                label, pct_sum, tolerance
            )));
        }
    }

    errors
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
