pub mod node;
pub mod tree;
pub mod validation;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

pub use node::{Bucket, Contents, NodeKind, NodeStats, StatsNode};
pub use tree::StatsTree;
pub use validation::{validate_node, validate_root};
pub use value::{MetricSample, StatValue};
