use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::value::MetricSample;

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// Aggregate scope: the whole run or a named group of requests.
    Group,
    /// One distinct request type.
    Request,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Group => "GROUP",
            NodeKind::Request => "REQUEST",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Bucket
// ---------------------------------------------------------------------------

/// One response-time classification bucket (e.g. `t < 800 ms`, `failed`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
    /// Label as shown in the report; may contain inline markup such as `<br>`.
    #[serde(rename = "htmlName")]
    pub display_label: String,
    pub count: u64,
    /// Share of all requests, in whole percent.
    pub percentage: u32,
}

// ---------------------------------------------------------------------------
// NodeStats
// ---------------------------------------------------------------------------

/// The metrics record of one scope, i.e. the `stats` object of a node.
///
/// Field order follows the artifact so that re-serialized output lines up
/// with what the producer writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStats {
    pub name: String,
    pub number_of_requests: MetricSample,
    pub min_response_time: MetricSample,
    pub max_response_time: MetricSample,
    pub mean_response_time: MetricSample,
    pub standard_deviation: MetricSample,
    pub percentiles1: MetricSample,
    pub percentiles2: MetricSample,
    pub percentiles3: MetricSample,
    pub percentiles4: MetricSample,
    #[serde(rename = "group1")]
    pub fast: Bucket,
    #[serde(rename = "group2")]
    pub medium: Bucket,
    #[serde(rename = "group3")]
    pub slow: Bucket,
    #[serde(rename = "group4")]
    pub failed: Bucket,
    pub mean_number_of_requests_per_second: MetricSample,
}

impl NodeStats {
    /// The four buckets in classification order: fast, medium, slow, failed.
    pub fn buckets(&self) -> [&Bucket; 4] {
        [&self.fast, &self.medium, &self.slow, &self.failed]
    }
}

// ---------------------------------------------------------------------------
// StatsNode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub path: String,
    /// Stable identifier used as the key in the parent's `contents`.
    #[serde(rename = "pathFormatted")]
    pub path_id: String,
    pub stats: NodeStats,
    #[serde(default, skip_serializing_if = "Contents::is_empty")]
    pub contents: Contents,
}

impl StatsNode {
    pub fn children(&self) -> impl Iterator<Item = &StatsNode> {
        self.contents.nodes()
    }

    /// Depth-first search for a node by `pathFormatted`, including `self`.
    pub fn find(&self, path_id: &str) -> Option<&StatsNode> {
        if self.path_id == path_id {
            return Some(self);
        }
        self.children().find_map(|child| child.find(path_id))
    }

    /// Pre-order traversal: `self` first, then each child subtree in order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order iterator over a node and its descendants.
pub struct Walk<'a> {
    stack: Vec<&'a StatsNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a StatsNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let children: Vec<&StatsNode> = node.children().collect();
        self.stack.extend(children.into_iter().rev());
        Some(node)
    }
}

// ---------------------------------------------------------------------------
// Contents: ordered pathFormatted -> child map
// ---------------------------------------------------------------------------

/// Child nodes keyed by `pathFormatted`, in the order the producer wrote them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contents {
    entries: Vec<(String, StatsNode)>,
}

impl Contents {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&StatsNode> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatsNode)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StatsNode> {
        self.entries.iter().map(|(_, n)| n)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Keys each node by its own `pathFormatted`.
impl FromIterator<StatsNode> for Contents {
    fn from_iter<I: IntoIterator<Item = StatsNode>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|node| (node.path_id.clone(), node))
                .collect(),
        }
    }
}

impl Serialize for Contents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

struct ContentsVisitor;

impl<'de> Visitor<'de> for ContentsVisitor {
    type Value = Contents;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of pathFormatted to stats node")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Contents, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries: Vec<(String, StatsNode)> =
            Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, node)) = access.next_entry::<String, StatsNode>()? {
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(de::Error::custom(format!("duplicate contents key '{key}'")));
            }
            entries.push((key, node));
        }
        Ok(Contents { entries })
    }
}

impl<'de> Deserialize<'de> for Contents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ContentsVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::{make_group, make_request};

    #[test]
    fn node_kind_wire_names() {
        assert_eq!(serde_json::to_string(&NodeKind::Group).unwrap(), "\"GROUP\"");
        assert_eq!(serde_json::to_string(&NodeKind::Request).unwrap(), "\"REQUEST\"");
        assert_eq!(NodeKind::Request.to_string(), "REQUEST");
    }

    #[test]
    fn stats_use_artifact_field_names() {
        let node = make_request("GET /orders", 10, 8, 2);
        let value = serde_json::to_value(&node.stats).expect("serialize");
        for key in [
            "numberOfRequests",
            "minResponseTime",
            "standardDeviation",
            "percentiles4",
            "group1",
            "group4",
            "meanNumberOfRequestsPerSecond",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert!(value["group2"].get("htmlName").is_some());
    }

    #[test]
    fn request_node_omits_contents() {
        let node = make_request("GET /orders", 10, 8, 2);
        let value = serde_json::to_value(&node).expect("serialize");
        assert!(value.get("contents").is_none());
        assert_eq!(value["pathFormatted"], "req_get--orders");
        assert_eq!(value["type"], "REQUEST");
    }

    #[test]
    fn contents_keep_producer_order() {
        let json = serde_json::to_string(&make_group(vec![
            make_request("POST /z", 1, 1, 0),
            make_request("GET /a", 1, 1, 0),
            make_request("GET /m", 1, 1, 0),
        ]))
        .expect("serialize");
        let back: StatsNode = serde_json::from_str(&json).expect("parse");
        let keys: Vec<&str> = back.contents.keys().collect();
        assert_eq!(keys, vec!["req_post--z", "req_get--a", "req_get--m"]);
    }

    #[test]
    fn duplicate_contents_key_is_rejected() {
        let child = serde_json::to_string(&make_request("GET /a", 1, 1, 0)).unwrap();
        let json = format!(r#"{{"k": {child}, "k": {child}}}"#);
        let err = serde_json::from_str::<Contents>(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate contents key"));
    }

    #[test]
    fn find_and_walk_cover_nested_groups() {
        let mut inner = make_group(vec![make_request("GET /deep", 2, 2, 0)]);
        inner.name = "Checkout".to_string();
        inner.path_id = "group_checkout".to_string();
        let root = make_group(vec![make_request("GET /a", 2, 2, 0), inner]);

        let order: Vec<&str> = root.walk().map(|n| n.path_id.as_str()).collect();
        assert_eq!(
            order,
            vec!["group_all-requests", "req_get--a", "group_checkout", "req_get--deep"]
        );
        assert_eq!(root.find("req_get--deep").map(|n| n.name.as_str()), Some("GET /deep"));
        assert!(root.find("nope").is_none());
    }

    #[test]
    fn buckets_are_in_classification_order() {
        let node = make_request("GET /a", 10, 7, 3);
        let names: Vec<&str> = node.stats.buckets().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["t < 800 ms", "800 ms <= t < 1200 ms", "t ≥ 1200 ms", "failed"]
        );
    }
}
