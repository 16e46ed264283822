pub mod export;

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use export::{export_csv, export_html, export_json};

// ---------------------------------------------------------------------------
// RunInfo: what the report directory name tells us
// ---------------------------------------------------------------------------

/// Simulation name and start time of the run that produced a report.
///
/// The producer names each report directory `<simulation>-<timestamp>`, the
/// timestamp being `yyyyMMddHHmmssSSS` in UTC, e.g.
/// `ordersstresstest-20251208045140646`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunInfo {
    pub simulation: String,
    pub started_at: DateTime<Utc>,
}

impl RunInfo {
    pub fn from_dir_name(name: &str) -> Option<Self> {
        let re = Regex::new(r"^(?P<simulation>.+)-(?P<stamp>\d{17})$").ok()?;
        let caps = re.captures(name)?;
        let started_at = parse_stamp(&caps["stamp"])?;
        Some(Self {
            simulation: caps["simulation"].to_string(),
            started_at,
        })
    }

    /// Search `path` and its ancestors for a report directory name.
    pub fn from_artifact_path(path: &Path) -> Option<Self> {
        path.ancestors()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .find_map(Self::from_dir_name)
    }
}

fn parse_stamp(stamp: &str) -> Option<DateTime<Utc>> {
    let field = |range: std::ops::Range<usize>| stamp.get(range)?.parse::<u32>().ok();
    let year = stamp.get(0..4)?.parse::<i32>().ok()?;
    let naive = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)?.and_hms_milli_opt(
        field(8..10)?,
        field(10..12)?,
        field(12..14)?,
        field(14..17)?,
    )?;
    Some(naive.and_utc())
}

// ---------------------------------------------------------------------------
// ReportOptions
// ---------------------------------------------------------------------------

/// Knobs for the HTML report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportOptions {
    /// Page title; defaults to the simulation name, then the root node name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Emit a response-time distribution table per node.
    #[serde(default = "default_true")]
    pub include_buckets: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: None,
            include_buckets: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::path::PathBuf;

    #[test]
    fn run_info_from_report_dir_name() {
        let info = RunInfo::from_dir_name("ordersstresstest-20251208045140646").expect("should match");
        assert_eq!(info.simulation, "ordersstresstest");
        assert_eq!(info.started_at.year(), 2025);
        assert_eq!(info.started_at.month(), 12);
        assert_eq!(info.started_at.day(), 8);
        assert_eq!(info.started_at.hour(), 4);
        assert_eq!(info.started_at.minute(), 51);
        assert_eq!(info.started_at.second(), 40);
        assert_eq!(info.started_at.timestamp_subsec_millis(), 646);
    }

    #[test]
    fn simulation_name_may_contain_dashes() {
        let info = RunInfo::from_dir_name("my-sim-20240101000000000").expect("should match");
        assert_eq!(info.simulation, "my-sim");
    }

    #[test]
    fn non_matching_names_yield_none() {
        assert!(RunInfo::from_dir_name("js").is_none());
        assert!(RunInfo::from_dir_name("sim-2025120804514064").is_none());
        // Month 13 does not exist.
        assert!(RunInfo::from_dir_name("sim-20251308045140646").is_none());
    }

    #[test]
    fn run_info_found_in_ancestors() {
        let path = PathBuf::from("/reports/gatling/checkout-20240615120000001/js/stats.js");
        let info = RunInfo::from_artifact_path(&path).expect("should find dir");
        assert_eq!(info.simulation, "checkout");
        assert!(RunInfo::from_artifact_path(&PathBuf::from("/tmp/stats.json")).is_none());
    }

    #[test]
    fn report_options_default_includes_buckets() {
        let opts = ReportOptions::default();
        assert!(opts.include_buckets);
        assert!(opts.title.is_none());
        let parsed: ReportOptions = serde_json::from_str("{}").expect("should parse");
        assert_eq!(parsed, opts);
    }
}
