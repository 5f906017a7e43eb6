//! Global layers: one synchronized print pass across parts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Result, SlicerError};
use crate::part::{BuildPart, PartId, StepPair};

/// One pass of the scheduler's output stream.
///
/// Holds at most one step pair per part, stored as a handle (the step's
/// index within its part) rather than the step itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalLayer {
    index: usize,
    step_pairs: BTreeMap<PartId, usize>,
}

impl GlobalLayer {
    /// Create an empty global layer.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            step_pairs: BTreeMap::new(),
        }
    }

    /// Position in the scheduled stream.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Add a part's step pair. A part may only appear once per layer.
    pub fn add_step_pair(&mut self, part: PartId, step_index: usize) -> Result<()> {
        if self.step_pairs.contains_key(&part) {
            return Err(SlicerError::DuplicateStepPair {
                part,
                layer: self.index,
            });
        }
        self.step_pairs.insert(part, step_index);
        Ok(())
    }

    /// Part → step index view.
    pub fn step_pairs(&self) -> &BTreeMap<PartId, usize> {
        &self.step_pairs
    }

    /// Step index held for `part`, if any.
    pub fn step_index(&self, part: PartId) -> Option<usize> {
        self.step_pairs.get(&part).copied()
    }

    /// Number of parts printing in this layer.
    pub fn len(&self) -> usize {
        self.step_pairs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.step_pairs.is_empty()
    }

    /// Resolve handles against the parts they came from, in part-id order.
    ///
    /// Entries that no longer resolve (unknown part, index out of range)
    /// are logged and skipped.
    pub fn resolve<'a, P: BuildPart>(&self, parts: &'a [P]) -> Vec<(PartId, &'a StepPair)> {
        self.step_pairs
            .iter()
            .filter_map(|(&id, &step_index)| {
                let step_pair = parts
                    .iter()
                    .find(|p| p.id() == id)
                    .and_then(|p| p.step_pair(step_index));
                if step_pair.is_none() {
                    log::warn!(
                        "global layer {}: no step pair {} for part {}",
                        self.index,
                        step_index,
                        id
                    );
                }
                step_pair.map(|sp| (id, sp))
            })
            .collect()
    }
}
