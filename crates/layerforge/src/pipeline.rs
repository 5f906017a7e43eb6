//! Per-layer region compute driver.

use rayon::prelude::*;

use crate::config::InfillConfig;
use crate::infill::InfillSector;
use crate::layer::GlobalLayer;
use crate::part::{BuildPart, PartId};
use crate::pattern::PatternGenerator;

/// Computed infill for one part's step within a global layer.
#[derive(Debug, Clone)]
pub struct SectorJob {
    /// Part the step belongs to.
    pub part: PartId,
    /// Step index within the part.
    pub step_index: usize,
    /// Synthesized region.
    pub sector: InfillSector,
}

/// Compute an infill sector for every step pair in `layer`.
///
/// Each sector works on its own copy of the step's geometry, so the sectors
/// run in parallel. A sector is computed for its part's own layer number
/// (the step index, not the global layer index) and stamps the step's layer
/// height. Results come back in part-id order; handles that do not resolve
/// are skipped.
pub fn compute_global_layer<P, G>(
    layer: &GlobalLayer,
    parts: &[P],
    config: &InfillConfig,
    generator: &G,
) -> Vec<SectorJob>
where
    P: BuildPart,
    G: PatternGenerator + ?Sized,
{
    let mut jobs: Vec<SectorJob> = layer
        .resolve(parts)
        .into_iter()
        .filter_map(|(part, step_pair)| {
            let step_index = layer.step_index(part)?;
            let sector = InfillSector::new(0, step_pair.printing_layer.geometry.clone())
                .with_sector_angle(config.sector_angle.to_radians())
                .with_start_vector(config.start_vector())
                .with_layer_height(step_pair.printing_layer.layer_height);
            Some(SectorJob {
                part,
                step_index,
                sector,
            })
        })
        .collect();

    jobs.par_iter_mut()
        .for_each(|job| job.sector.compute(job.step_index, config, generator));

    log::debug!(
        "global layer {}: computed {} sectors",
        layer.index(),
        jobs.len()
    );
    jobs
}
