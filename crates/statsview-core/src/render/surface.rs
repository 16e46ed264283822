use std::collections::BTreeMap;

use super::{DisplaySurface, SlotId, SlotSink};

/// In-memory display surface with one sink per slot.
///
/// A fresh surface has every slot present and empty. Slots iterate in render
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct MemorySurface<S = String> {
    slots: BTreeMap<SlotId, S>,
}

impl<S: SlotSink + Default> MemorySurface<S> {
    pub fn new() -> Self {
        Self::with_slots(SlotId::all())
    }

    /// A surface offering only `slots`.
    pub fn with_slots(slots: impl IntoIterator<Item = SlotId>) -> Self {
        Self {
            slots: slots.into_iter().map(|slot| (slot, S::default())).collect(),
        }
    }

    /// Reset every slot to empty, keeping the set of slots.
    pub fn clear(&mut self) {
        for sink in self.slots.values_mut() {
            *sink = S::default();
        }
    }
}

impl<S: SlotSink + Default> Default for MemorySurface<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MemorySurface<S> {
    pub fn get(&self, slot: SlotId) -> Option<&S> {
        self.slots.get(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &S)> {
        self.slots.iter().map(|(slot, sink)| (*slot, sink))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<S: AsRef<str>> MemorySurface<S> {
    pub fn text(&self, slot: SlotId) -> Option<&str> {
        self.get(slot).map(AsRef::as_ref)
    }

    /// Look up a slot by its string id, e.g. `"percentiles2OK"`.
    pub fn text_by_id(&self, id: &str) -> Option<&str> {
        let slot: SlotId = id.parse().ok()?;
        self.text(slot)
    }
}

impl<S: SlotSink> DisplaySurface for MemorySurface<S> {
    fn sink(&mut self, slot: SlotId) -> Option<&mut dyn SlotSink> {
        self.slots
            .get_mut(&slot)
            .map(|sink| sink as &mut dyn SlotSink)
    }
}

// ---------------------------------------------------------------------------
// HtmlSink
// ---------------------------------------------------------------------------

/// A sink holding HTML-escaped text, ready to splice into markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlSink(String);

impl HtmlSink {
    pub fn as_html(&self) -> &str {
        &self.0
    }
}

impl SlotSink for HtmlSink {
    fn append(&mut self, text: &str) {
        self.0.push_str(&html_escape(text));
    }
}

impl AsRef<str> for HtmlSink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub type HtmlSurface = MemorySurface<HtmlSink>;

/// Minimal HTML escaping for text content and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
