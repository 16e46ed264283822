pub mod surface;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::StatsError;
use crate::model::{MetricSample, NodeStats, StatValue};

pub use surface::{HtmlSink, HtmlSurface, MemorySurface};

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The scalar statistics written by [`render`], in render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    NumberOfRequests,
    MinResponseTime,
    MaxResponseTime,
    MeanResponseTime,
    StandardDeviation,
    Percentiles1,
    Percentiles2,
    Percentiles3,
    Percentiles4,
    MeanRequestsPerSecond,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::NumberOfRequests,
        Metric::MinResponseTime,
        Metric::MaxResponseTime,
        Metric::MeanResponseTime,
        Metric::StandardDeviation,
        Metric::Percentiles1,
        Metric::Percentiles2,
        Metric::Percentiles3,
        Metric::Percentiles4,
        Metric::MeanRequestsPerSecond,
    ];

    /// Slot id prefix; also the field name in the artifact.
    pub fn id(&self) -> &'static str {
        match self {
            Metric::NumberOfRequests => "numberOfRequests",
            Metric::MinResponseTime => "minResponseTime",
            Metric::MaxResponseTime => "maxResponseTime",
            Metric::MeanResponseTime => "meanResponseTime",
            Metric::StandardDeviation => "standardDeviation",
            Metric::Percentiles1 => "percentiles1",
            Metric::Percentiles2 => "percentiles2",
            Metric::Percentiles3 => "percentiles3",
            Metric::Percentiles4 => "percentiles4",
            Metric::MeanRequestsPerSecond => "meanNumberOfRequestsPerSecond",
        }
    }

    /// Column heading for tabular output. Percentile cutoffs are chosen by
    /// the producer, so they are labelled by position.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::NumberOfRequests => "Requests",
            Metric::MinResponseTime => "Min (ms)",
            Metric::MaxResponseTime => "Max (ms)",
            Metric::MeanResponseTime => "Mean (ms)",
            Metric::StandardDeviation => "Std Dev (ms)",
            Metric::Percentiles1 => "Percentile 1 (ms)",
            Metric::Percentiles2 => "Percentile 2 (ms)",
            Metric::Percentiles3 => "Percentile 3 (ms)",
            Metric::Percentiles4 => "Percentile 4 (ms)",
            Metric::MeanRequestsPerSecond => "Requests/s",
        }
    }

    pub fn sample<'a>(&self, stats: &'a NodeStats) -> &'a MetricSample {
        match self {
            Metric::NumberOfRequests => &stats.number_of_requests,
            Metric::MinResponseTime => &stats.min_response_time,
            Metric::MaxResponseTime => &stats.max_response_time,
            Metric::MeanResponseTime => &stats.mean_response_time,
            Metric::StandardDeviation => &stats.standard_deviation,
            Metric::Percentiles1 => &stats.percentiles1,
            Metric::Percentiles2 => &stats.percentiles2,
            Metric::Percentiles3 => &stats.percentiles3,
            Metric::Percentiles4 => &stats.percentiles4,
            Metric::MeanRequestsPerSecond => &stats.mean_number_of_requests_per_second,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    Total,
    Ok,
    Ko,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Total, Outcome::Ok, Outcome::Ko];

    /// Suffix appended to the metric id to form the slot id.
    pub fn suffix(&self) -> &'static str {
        match self {
            Outcome::Total => "",
            Outcome::Ok => "OK",
            Outcome::Ko => "KO",
        }
    }

    pub fn pick(&self, sample: &MetricSample) -> StatValue {
        match self {
            Outcome::Total => sample.total,
            Outcome::Ok => sample.ok,
            Outcome::Ko => sample.ko,
        }
    }
}

// ---------------------------------------------------------------------------
// SlotId
// ---------------------------------------------------------------------------

/// A named display slot such as `numberOfRequests` or `percentiles3KO`.
///
/// The string form is the contract with the display surface and must not
/// change. Ordering follows render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    pub metric: Metric,
    pub outcome: Outcome,
}

impl SlotId {
    pub fn new(metric: Metric, outcome: Outcome) -> Self {
        Self { metric, outcome }
    }

    /// Every slot in the order [`render`] writes them.
    pub fn all() -> impl Iterator<Item = SlotId> {
        Metric::ALL.into_iter().flat_map(|metric| {
            Outcome::ALL
                .into_iter()
                .map(move |outcome| SlotId::new(metric, outcome))
        })
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.metric.id(), self.outcome.suffix())
    }
}

impl FromStr for SlotId {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotId::all()
            .find(|slot| slot.to_string() == s)
            .ok_or_else(|| StatsError::MissingSlot(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Sinks and surfaces
// ---------------------------------------------------------------------------

/// A writable destination for one slot. Writes append.
pub trait SlotSink {
    fn append(&mut self, text: &str);
}

impl SlotSink for String {
    fn append(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Provides a sink per named slot. Returning `None` means the surface has no
/// such slot.
pub trait DisplaySurface {
    fn sink(&mut self, slot: SlotId) -> Option<&mut dyn SlotSink>;
}

/// Sinks looked up by their string id, the way a page looks up elements.
impl<S: SlotSink> DisplaySurface for HashMap<String, S> {
    fn sink(&mut self, slot: SlotId) -> Option<&mut dyn SlotSink> {
        self.get_mut(&slot.to_string())
            .map(|sink| sink as &mut dyn SlotSink)
    }
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Write the scalar statistics of `stats` into `surface`.
///
/// For each metric in [`Metric::ALL`] order, the total, ok and ko values are
/// appended to the `<id>`, `<id>OK` and `<id>KO` slots. Writes append, so
/// rendering twice without clearing the surface leaves every value doubled
/// (`"4578045780"`); clear the surface between nodes.
///
/// Buckets are not written; see [`NodeStats::buckets`].
///
/// Fails with [`StatsError::MissingSlot`] at the first slot the surface
/// cannot provide. Slots written before that point keep their text.
pub fn render<D>(stats: &NodeStats, surface: &mut D) -> Result<(), StatsError>
where
    D: DisplaySurface + ?Sized,
{
    for slot in SlotId::all() {
        let value = slot.outcome.pick(slot.metric.sample(stats));
        let sink = surface
            .sink(slot)
            .ok_or_else(|| StatsError::MissingSlot(slot.to_string()))?;
        sink.append(&value.to_string());
    }
    Ok(())
}
