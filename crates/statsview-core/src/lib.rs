pub mod artifact;
pub mod error;
pub mod model;
pub mod render;
pub mod report;

pub use error::StatsError;
pub use model::{StatsNode, StatsTree};
pub use render::{render, DisplaySurface, SlotId, SlotSink};
