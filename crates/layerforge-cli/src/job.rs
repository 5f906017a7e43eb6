//! Job files: a [`Config`] plus the parts to schedule.

use std::path::Path;

use anyhow::{Context, Result};
use layerforge::{Config, Part, PartId, Polygon, Step};
use layerforge_math::{Plane, Point2, Point3};
use serde::Deserialize;

/// A parsed job file.
#[derive(Debug, Deserialize)]
pub struct Job {
    #[serde(flatten)]
    pub config: Config,
    #[serde(default)]
    pub parts: Vec<PartSpec>,
}

#[derive(Debug, Deserialize)]
pub struct PartSpec {
    pub id: u32,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Deserialize)]
pub struct StepSpec {
    /// Offset of the slicing plane along the stacking axis (mm).
    pub z: f64,
    /// Falls back to the infill layer height.
    pub layer_height: Option<f64>,
    /// Loops in the slicing plane's local XY, outer loops and holes alike.
    #[serde(default)]
    pub outline: Vec<Vec<[f64; 2]>>,
}

impl Job {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading job file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in job file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let job: Job = toml::from_str(text).context("decoding job")?;
        job.config.validate()?;
        Ok(job)
    }

    /// Build parts with slicing planes normal to the configured stacking axis.
    pub fn build_parts(&self) -> Vec<Part> {
        let axis = self.config.scheduler.orientation().stacking_direction();

        self.parts
            .iter()
            .map(|spec| {
                let mut part = Part::new(PartId(spec.id));
                for step in &spec.steps {
                    let origin = Point3::from(axis.into_inner() * step.z);
                    part.push_step_pair(Step {
                        slicing_plane: Plane::new(origin, axis.into_inner()),
                        layer_height: step
                            .layer_height
                            .unwrap_or(self.config.infill.layer_height),
                        geometry: step
                            .outline
                            .iter()
                            .map(|points| {
                                Polygon::new(
                                    points.iter().map(|&[x, y]| Point2::new(x, y)).collect(),
                                )
                            })
                            .collect(),
                    });
                }
                part
            })
            .collect()
    }
}
