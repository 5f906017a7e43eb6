//! Global layer scheduling.
//!
//! Merges the independently sliced step sequences of several parts into one
//! ordered stream of [`GlobalLayer`]s. Each part's steps appear in their
//! original order, exactly once, across the emitted layers.

use layerforge_math::{Dir3, Plane, Point3};

use crate::config::{LayerOrdering, SchedulerConfig};
use crate::error::Result;
use crate::layer::GlobalLayer;
use crate::part::{BuildPart, StepPair};

/// Order every step of every part into global layers.
///
/// Pure and synchronous: the parts must not be mutated while this runs.
/// Fails only if two parts share an id.
pub fn schedule<P: BuildPart>(parts: &[P], config: &SchedulerConfig) -> Result<Vec<GlobalLayer>> {
    let layers = match config.layer_ordering {
        LayerOrdering::ByHeight => schedule_by_height(parts, config)?,
        LayerOrdering::ByLayerNumber => schedule_by_layer_number(parts)?,
        LayerOrdering::ByPart => schedule_by_part(parts)?,
    };

    log::info!(
        "scheduled {} global layers from {} parts ({:?})",
        layers.len(),
        parts.len(),
        config.layer_ordering
    );
    Ok(layers)
}

/// Build a single global layer (index 0) from each part's dirty steps.
///
/// Used by incremental slicers that only re-print what changed. The
/// ordering policy is not consulted. A part with more than one dirty step
/// violates the one-step-per-part rule and is reported as an error.
pub fn populate_step<P: BuildPart>(parts: &[P]) -> Result<GlobalLayer> {
    let mut layer = GlobalLayer::new(0);
    for part in parts {
        for step_index in part.dirty_step_pairs() {
            layer.add_step_pair(part.id(), step_index)?;
        }
    }
    Ok(layer)
}

/// Step pair under a part's cursor, or `None` once the part is exhausted.
///
/// A part that reports a step it cannot hand out is treated as exhausted
/// and logged.
fn current<P: BuildPart>(part: &P, cursor: usize) -> Option<&StepPair> {
    let count = part.count_step_pairs();
    if cursor >= count {
        return None;
    }
    let step_pair = part.step_pair(cursor);
    if step_pair.is_none() {
        log::warn!(
            "part {}: no step pair {} of {}, dropping its remaining steps",
            part.id(),
            cursor,
            count
        );
    }
    step_pair
}

/// Distance of a step's mid-plane from the world origin along the stacking axis.
fn stacking_distance(step_pair: &StepPair, direction: &Dir3) -> f64 {
    let mid = step_pair.printing_layer.mid_plane();
    let origin = Point3::origin();
    mid.distance_along(&origin, direction)
        // Plane parallel to the axis: fall back to projecting its origin
        .unwrap_or_else(|| mid.origin().coords.dot(direction.as_ref()))
}

/// Interleave parts by mid-plane height.
///
/// Each pass picks the lowest current mid-plane (first part wins ties),
/// then every part whose current mid-plane is within the grouping
/// tolerance of it joins the layer and advances one step.
fn schedule_by_height<P: BuildPart>(
    parts: &[P],
    config: &SchedulerConfig,
) -> Result<Vec<GlobalLayer>> {
    let direction = config.orientation().stacking_direction();
    let tolerance = config.grouping_tolerance;

    let mut cursors = vec![0usize; parts.len()];
    let mut layers = Vec::new();

    loop {
        let mut reference: Option<(usize, Plane, f64)> = None;
        for (slot, part) in parts.iter().enumerate() {
            let Some(step_pair) = current(part, cursors[slot]) else {
                continue;
            };
            let dist = stacking_distance(step_pair, &direction);
            let is_lower = match reference {
                None => true,
                Some((_, _, min_dist)) => dist < min_dist,
            };
            if is_lower {
                reference = Some((slot, step_pair.printing_layer.mid_plane(), dist));
            }
        }

        let Some((reference_slot, reference_plane, _)) = reference else {
            break;
        };

        let mut layer = GlobalLayer::new(layers.len());
        for (slot, part) in parts.iter().enumerate() {
            let Some(step_pair) = current(part, cursors[slot]) else {
                continue;
            };
            // The reference part always joins, even if its plane is degenerate
            let joins = slot == reference_slot
                || reference_plane.is_equal(&step_pair.printing_layer.mid_plane(), tolerance);
            if joins {
                layer.add_step_pair(part.id(), cursors[slot])?;
                cursors[slot] += 1;
            }
        }

        log::debug!("global layer {}: {} parts", layer.index(), layer.len());
        layers.push(layer);
    }

    Ok(layers)
}

/// Layer `i` collects step `i` of every part that has one.
fn schedule_by_layer_number<P: BuildPart>(parts: &[P]) -> Result<Vec<GlobalLayer>> {
    let max_steps = parts
        .iter()
        .map(BuildPart::count_step_pairs)
        .max()
        .unwrap_or(0);

    let mut layers = Vec::with_capacity(max_steps);
    for step in 0..max_steps {
        let mut layer = GlobalLayer::new(step);
        for part in parts {
            if step < part.count_step_pairs() {
                layer.add_step_pair(part.id(), step)?;
            }
        }
        layers.push(layer);
    }
    Ok(layers)
}

/// Parts print one after another; every step gets its own layer.
fn schedule_by_part<P: BuildPart>(parts: &[P]) -> Result<Vec<GlobalLayer>> {
    let total: usize = parts.iter().map(BuildPart::count_step_pairs).sum();

    let mut layers = Vec::with_capacity(total);
    for part in parts {
        for step in 0..part.count_step_pairs() {
            let mut layer = GlobalLayer::new(layers.len());
            layer.add_step_pair(part.id(), step)?;
            layers.push(layer);
        }
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlicerError;
    use crate::part::{Part, PartId, Step};
    use layerforge_math::{Plane, Point3, Vec3};
    use std::collections::{BTreeMap, BTreeSet};

    const LAYER_HEIGHT: f64 = 0.2;

    /// Part whose steps have mid-planes at the given heights.
    fn part_at(id: u32, mid_heights: &[f64]) -> Part {
        let mut part = Part::new(PartId(id));
        for &h in mid_heights {
            part.push_step_pair(Step {
                slicing_plane: Plane::horizontal(h - LAYER_HEIGHT / 2.0),
                layer_height: LAYER_HEIGHT,
                geometry: Vec::new(),
            });
        }
        part
    }

    fn config(ordering: LayerOrdering) -> SchedulerConfig {
        SchedulerConfig {
            layer_ordering: ordering,
            grouping_tolerance: 0.01,
            ..Default::default()
        }
    }

    fn as_maps(layers: &[GlobalLayer]) -> Vec<BTreeMap<u32, usize>> {
        layers
            .iter()
            .map(|l| l.step_pairs().iter().map(|(id, &s)| (id.0, s)).collect())
            .collect()
    }

    /// Every (part, step) exactly once, and per-part layer indices strictly increasing.
    fn assert_exhaustive_and_monotonic(parts: &[Part], layers: &[GlobalLayer]) {
        let mut seen = BTreeSet::new();
        let mut last_layer: BTreeMap<PartId, (usize, usize)> = BTreeMap::new();
        for layer in layers {
            for (&id, &step) in layer.step_pairs() {
                assert!(seen.insert((id, step)), "duplicate {id}:{step}");
                if let Some(&(prev_layer, prev_step)) = last_layer.get(&id) {
                    assert!(layer.index() > prev_layer);
                    assert_eq!(step, prev_step + 1);
                } else {
                    assert_eq!(step, 0);
                }
                last_layer.insert(id, (layer.index(), step));
            }
        }
        let expected: BTreeSet<_> = parts
            .iter()
            .flat_map(|p| (0..p.count_step_pairs()).map(move |s| (p.id(), s)))
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_by_height_grouping() {
        let parts = vec![part_at(1, &[0.0, 1.0, 2.0]), part_at(2, &[0.0, 2.0])];
        let layers = schedule(&parts, &config(LayerOrdering::ByHeight)).unwrap();

        assert_eq!(
            as_maps(&layers),
            vec![
                BTreeMap::from([(1, 0), (2, 0)]),
                BTreeMap::from([(1, 1)]),
                BTreeMap::from([(1, 2), (2, 1)]),
            ]
        );
        assert_eq!(
            layers.iter().map(GlobalLayer::index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_by_height_tolerance_bounds_grouping() {
        let parts = vec![part_at(1, &[0.0]), part_at(2, &[0.005]), part_at(3, &[0.02])];
        let layers = schedule(&parts, &config(LayerOrdering::ByHeight)).unwrap();
        assert_eq!(
            as_maps(&layers),
            vec![BTreeMap::from([(1, 0), (2, 0)]), BTreeMap::from([(3, 0)])]
        );
    }

    #[test]
    fn test_by_height_tie_goes_to_first_part() {
        // Both parts start at the same height; with zero tolerance only exact matches group
        let parts = vec![part_at(7, &[1.0, 1.5]), part_at(3, &[1.0])];
        let cfg = SchedulerConfig {
            grouping_tolerance: 0.0,
            ..config(LayerOrdering::ByHeight)
        };
        let layers = schedule(&parts, &cfg).unwrap();
        assert_eq!(
            as_maps(&layers),
            vec![BTreeMap::from([(7, 0), (3, 0)]), BTreeMap::from([(7, 1)])]
        );
    }

    #[test]
    fn test_by_height_exhaustive_with_uneven_parts() {
        let parts = vec![
            part_at(1, &[0.1, 0.3, 0.5, 0.7, 0.9, 1.1]),
            part_at(2, &[0.15, 0.45, 0.75, 1.05]),
            part_at(3, &[]),
            part_at(4, &[0.3, 0.6, 0.9, 1.2, 1.5, 1.8, 2.1]),
        ];
        let layers = schedule(&parts, &config(LayerOrdering::ByHeight)).unwrap();
        assert_exhaustive_and_monotonic(&parts, &layers);
        assert!(layers.iter().all(|l| !l.is_empty()));
    }

    #[test]
    fn test_by_height_follows_tilted_stacking_axis() {
        // Stacking axis tilted 90° about X points along -Y; planes are ordered along it
        let mut part = Part::new(PartId(1));
        for y in [0.0, -1.0, -2.0] {
            part.push_step_pair(Step {
                slicing_plane: Plane::new(Point3::new(0.0, y, 0.0), Vec3::new(0.0, -1.0, 0.0)),
                layer_height: 0.0,
                geometry: Vec::new(),
            });
        }
        let mut other = Part::new(PartId(2));
        other.push_step_pair(Step {
            slicing_plane: Plane::new(Point3::new(5.0, -1.0, 3.0), Vec3::new(0.0, -1.0, 0.0)),
            layer_height: 0.0,
            geometry: Vec::new(),
        });

        let cfg = SchedulerConfig {
            stacking_pitch: 90.0,
            ..config(LayerOrdering::ByHeight)
        };
        let parts = vec![part, other];
        let layers = schedule(&parts, &cfg).unwrap();
        assert_eq!(
            as_maps(&layers),
            vec![
                BTreeMap::from([(1, 0)]),
                BTreeMap::from([(1, 1), (2, 0)]),
                BTreeMap::from([(1, 2)]),
            ]
        );
    }

    /// Claims more steps than it stores.
    struct ShortPart(Part);

    impl BuildPart for ShortPart {
        fn id(&self) -> PartId {
            self.0.id()
        }

        fn count_step_pairs(&self) -> usize {
            self.0.count_step_pairs() + 2
        }

        fn step_pair(&self, index: usize) -> Option<&StepPair> {
            self.0.step_pair(index)
        }

        fn dirty_step_pairs(&self) -> Vec<usize> {
            self.0.dirty_step_pairs()
        }
    }

    #[test]
    fn test_by_height_stops_part_with_missing_step() {
        let parts = vec![
            ShortPart(part_at(1, &[0.0])),
            ShortPart(part_at(2, &[0.0, 1.0])),
        ];
        let layers = schedule(&parts, &config(LayerOrdering::ByHeight)).unwrap();
        assert_eq!(
            as_maps(&layers),
            vec![BTreeMap::from([(1, 0), (2, 0)]), BTreeMap::from([(2, 1)])]
        );
    }

    #[test]
    fn test_by_layer_number() {
        let parts = vec![
            part_at(1, &[0.0, 1.0]),
            part_at(2, &[5.0, 6.0, 7.0, 8.0]),
            part_at(3, &[0.0]),
        ];
        let layers = schedule(&parts, &config(LayerOrdering::ByLayerNumber)).unwrap();
        assert_eq!(layers.len(), 4);
        assert_eq!(layers[0].len(), 3);
        assert_eq!(layers[1].len(), 2);
        assert_eq!(as_maps(&layers)[3], BTreeMap::from([(2, 3)]));
        assert_exhaustive_and_monotonic(&parts, &layers);
    }

    #[test]
    fn test_by_part() {
        let parts = vec![part_at(1, &[0.0, 1.0]), part_at(2, &[0.0, 1.0, 2.0])];
        let layers = schedule(&parts, &config(LayerOrdering::ByPart)).unwrap();
        assert_eq!(layers.len(), 5);
        assert!(layers.iter().all(|l| l.len() == 1));
        assert_eq!(layers[2].step_index(PartId(2)), Some(0));
        assert_exhaustive_and_monotonic(&parts, &layers);
    }

    #[test]
    fn test_no_parts() {
        for ordering in [
            LayerOrdering::ByHeight,
            LayerOrdering::ByLayerNumber,
            LayerOrdering::ByPart,
        ] {
            let layers = schedule::<Part>(&[], &config(ordering)).unwrap();
            assert!(layers.is_empty());
        }
    }

    #[test]
    fn test_duplicate_part_ids_rejected() {
        let parts = vec![part_at(1, &[0.0]), part_at(1, &[0.0])];
        let err = schedule(&parts, &config(LayerOrdering::ByLayerNumber)).unwrap_err();
        assert!(matches!(err, SlicerError::DuplicateStepPair { .. }));
    }

    #[test]
    fn test_populate_step_uses_dirty_steps() {
        let mut a = part_at(1, &[0.0, 1.0, 2.0]);
        a.mark_clean();
        a.mark_dirty(2).unwrap();
        let mut b = part_at(2, &[0.0]);
        b.mark_clean();

        let layer = populate_step(&[a, b]).unwrap();
        assert_eq!(layer.index(), 0);
        assert_eq!(as_maps(&[layer])[0], BTreeMap::from([(1, 2)]));
    }

    #[test]
    fn test_populate_step_rejects_two_dirty_steps_for_one_part() {
        // Freshly pushed steps are all dirty
        let parts = vec![part_at(1, &[0.0, 1.0])];
        assert!(populate_step(&parts).is_err());
    }
}
