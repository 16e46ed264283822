//! Builders for consistent stats nodes, shared by unit tests.

use super::node::{Bucket, Contents, NodeKind, NodeStats, StatsNode};
use super::value::MetricSample;

pub(crate) fn path_id(prefix: &str, name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("{prefix}_{slug}")
}

fn bucket(name: &str, label: &str, count: u64, percentage: u32) -> Bucket {
    Bucket {
        name: name.to_string(),
        display_label: label.to_string(),
        count,
        percentage,
    }
}

/// A consistent record: every ok request is fast, every ko request failed.
pub(crate) fn make_stats(name: &str, total: u64, ok: u64, ko: u64) -> NodeStats {
    let (ok_pct, ko_pct) = if total > 0 {
        let ok_pct = ((ok as f64 * 100.0) / total as f64).round() as u32;
        (ok_pct, 100 - ok_pct)
    } else {
        (0, 0)
    };
    NodeStats {
        name: name.to_string(),
        number_of_requests: MetricSample::new(total, ok, ko),
        min_response_time: MetricSample::new(0u64, 1u64, 0u64),
        max_response_time: MetricSample::new(136u64, 136u64, 45u64),
        mean_response_time: MetricSample::new(4u64, 5u64, 3u64),
        standard_deviation: MetricSample::new(6u64, 8u64, 3u64),
        percentiles1: MetricSample::new(3u64, 3u64, 3u64),
        percentiles2: MetricSample::new(4u64, 5u64, 3u64),
        percentiles3: MetricSample::new(9u64, 10u64, 5u64),
        percentiles4: MetricSample::new(27u64, 36u64, 15u64),
        fast: bucket("t < 800 ms", "t < 800 ms", ok, ok_pct),
        medium: bucket("800 ms <= t < 1200 ms", "t ≥ 800 ms <br> t < 1200 ms", 0, 0),
        slow: bucket("t ≥ 1200 ms", "t ≥ 1200 ms", 0, 0),
        failed: bucket("failed", "failed", ko, ko_pct),
        mean_number_of_requests_per_second: MetricSample::new(169.556, 105.052, 64.504),
    }
}

pub(crate) fn make_request(name: &str, total: u64, ok: u64, ko: u64) -> StatsNode {
    StatsNode {
        kind: NodeKind::Request,
        name: name.to_string(),
        path: name.to_string(),
        path_id: path_id("req", name),
        stats: make_stats(name, total, ok, ko),
        contents: Contents::default(),
    }
}

/// An "All Requests" group whose counts are the sum of its children.
pub(crate) fn make_group(children: Vec<StatsNode>) -> StatsNode {
    let (ok, ko) = children.iter().fold((0u64, 0u64), |(ok, ko), child| {
        let requests = &child.stats.number_of_requests;
        (
            ok + requests.ok.as_count().unwrap_or(0),
            ko + requests.ko.as_count().unwrap_or(0),
        )
    });
    StatsNode {
        kind: NodeKind::Group,
        name: "All Requests".to_string(),
        path: String::new(),
        path_id: path_id("group", "All Requests"),
        stats: make_stats("All Requests", ok + ko, ok, ko),
        contents: children.into_iter().collect(),
    }
}

/// The "All Requests" record of the ordersstresstest run.
pub(crate) fn sample_stats() -> NodeStats {
    make_stats("All Requests", 45780, 28364, 17416)
}
