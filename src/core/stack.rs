//! Collapsing of repeated async-library frames in a stack trace
//!
//! Deeply chained futures produce long runs of frames from the executor's
//! internals. Only the first frame of each consecutive run is kept.

use super::record::StackFrame;

/// Source component collapsed by default
pub const DEFAULT_COLLAPSIBLE_SOURCE: &str = "futures";

/// Reduces consecutive frames from one marker source to a single frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackCollapser {
    marker: String,
}

impl StackCollapser {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Single left-to-right pass; relative order of kept frames is preserved
    pub fn collapse(&self, stack: &[StackFrame]) -> Vec<StackFrame> {
        let mut collapsed = Vec::with_capacity(stack.len());
        let mut previous_was_marker = false;

        for frame in stack {
            let is_marker = frame.source_component == self.marker;
            if is_marker && previous_was_marker {
                continue;
            }
            previous_was_marker = is_marker;
            collapsed.push(frame.clone());
        }

        collapsed
    }
}

impl Default for StackCollapser {
    fn default() -> Self {
        Self::new(DEFAULT_COLLAPSIBLE_SOURCE)
    }
}
