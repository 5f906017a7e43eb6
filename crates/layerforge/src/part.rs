//! Build parts and their per-layer steps.
//!
//! Parts are produced by the upstream slicing stage and are read-only to
//! the scheduler. Scheduling only needs the [`BuildPart`] view, so storage
//! owned elsewhere can be scheduled without copying it into a [`Part`].

use std::collections::BTreeSet;
use std::fmt;

use layerforge_math::Plane;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlicerError};
use crate::path::Polygon;

/// Stable identity of a build part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartId(pub u32);

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One layer of a part as sliced.
#[derive(Debug, Clone)]
pub struct Step {
    /// Plane the part was sectioned along.
    pub slicing_plane: Plane,
    /// Layer thickness (mm).
    pub layer_height: f64,
    /// Region outlines (outer loops and holes).
    pub geometry: Vec<Polygon>,
}

impl Step {
    /// Plane halfway through the layer's thickness.
    pub fn mid_plane(&self) -> Plane {
        self.slicing_plane.shifted(self.layer_height / 2.0)
    }
}

/// A part's unit of printable work at one layer index.
#[derive(Debug, Clone)]
pub struct StepPair {
    /// The layer that gets printed.
    pub printing_layer: Step,
}

impl From<Step> for StepPair {
    fn from(printing_layer: Step) -> Self {
        Self { printing_layer }
    }
}

/// Read access the scheduler needs from a build part.
pub trait BuildPart {
    /// Part identity.
    fn id(&self) -> PartId;

    /// Number of step pairs.
    fn count_step_pairs(&self) -> usize;

    /// Step pair at `index`, if in range.
    fn step_pair(&self, index: usize) -> Option<&StepPair>;

    /// Indices of step pairs changed since the last scheduling pass, ascending.
    fn dirty_step_pairs(&self) -> Vec<usize>;
}

/// A part with an append-only sequence of step pairs.
#[derive(Debug, Clone)]
pub struct Part {
    id: PartId,
    steps: Vec<StepPair>,
    dirty: BTreeSet<usize>,
}

impl Part {
    /// Create a part with no steps.
    pub fn new(id: PartId) -> Self {
        Self {
            id,
            steps: Vec::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Append a step pair; it starts out dirty.
    pub fn push_step_pair(&mut self, step_pair: impl Into<StepPair>) -> usize {
        let index = self.steps.len();
        self.steps.push(step_pair.into());
        self.dirty.insert(index);
        index
    }

    /// Flag an existing step pair as changed.
    pub fn mark_dirty(&mut self, index: usize) -> Result<()> {
        if index >= self.steps.len() {
            return Err(SlicerError::StepOutOfRange {
                part: self.id,
                index,
                count: self.steps.len(),
            });
        }
        self.dirty.insert(index);
        Ok(())
    }

    /// Clear every dirty flag.
    pub fn mark_clean(&mut self) {
        self.dirty.clear();
    }

    /// All step pairs in order.
    pub fn step_pairs(&self) -> &[StepPair] {
        &self.steps
    }
}

impl BuildPart for Part {
    fn id(&self) -> PartId {
        self.id
    }

    fn count_step_pairs(&self) -> usize {
        self.steps.len()
    }

    fn step_pair(&self, index: usize) -> Option<&StepPair> {
        self.steps.get(index)
    }

    fn dirty_step_pairs(&self) -> Vec<usize> {
        self.dirty.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_step(z: f64) -> Step {
        Step {
            slicing_plane: Plane::horizontal(z),
            layer_height: 0.2,
            geometry: Vec::new(),
        }
    }

    #[test]
    fn test_mid_plane() {
        let mid = flat_step(1.0).mid_plane();
        assert!((mid.origin().z - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut part = Part::new(PartId(3));
        assert_eq!(part.push_step_pair(flat_step(0.0)), 0);
        assert_eq!(part.push_step_pair(flat_step(0.2)), 1);
        assert_eq!(part.dirty_step_pairs(), vec![0, 1]);

        part.mark_clean();
        assert!(part.dirty_step_pairs().is_empty());

        part.mark_dirty(1).unwrap();
        assert_eq!(part.dirty_step_pairs(), vec![1]);
        assert!(matches!(
            part.mark_dirty(5),
            Err(SlicerError::StepOutOfRange { index: 5, count: 2, .. })
        ));
    }
}
