//! Immutable configuration read by the scheduler and the region synthesizer.
//!
//! A [`Config`] is loaded once (usually from TOML) and then passed by
//! reference into every scheduling and compute pass. Nothing in the crate
//! mutates it.

use std::path::Path;

use layerforge_math::{Orientation, Point2, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlicerError};

/// How per-part steps are merged into global layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerOrdering {
    /// Interleave parts by the height of each step's mid-plane.
    #[default]
    ByHeight,
    /// Layer `i` of every part prints together.
    ByLayerNumber,
    /// Parts print one after another, one step per global layer.
    ByPart,
}

impl TryFrom<i64> for LayerOrdering {
    type Error = SlicerError;

    fn try_from(code: i64) -> Result<Self> {
        match code {
            0 => Ok(LayerOrdering::ByHeight),
            1 => Ok(LayerOrdering::ByLayerNumber),
            2 => Ok(LayerOrdering::ByPart),
            other => Err(SlicerError::UnknownLayerOrdering(other)),
        }
    }
}

/// Infill pattern selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InfillPatternKind {
    /// Parallel lines.
    #[default]
    Lines,
    /// Two perpendicular line families.
    Grid,
    /// Inward rings following the outline.
    Concentric,
    /// Three line families 60° apart.
    Triangles,
    /// Three line families with a half-spacing shift (trihexagonal).
    HexagonsAndTriangles,
    /// Hexagonal cells sized by bead width.
    Honeycomb,
    /// Rays fanning out from the pivot across a sector.
    RadialHatch,
}

/// Global layer scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ordering policy.
    pub layer_ordering: LayerOrdering,
    /// Maximum offset along the stacking axis for two steps to share a layer (mm).
    pub grouping_tolerance: f64,
    /// Stacking direction pitch (degrees, about X).
    pub stacking_pitch: f64,
    /// Stacking direction yaw (degrees, about Z).
    pub stacking_yaw: f64,
    /// Stacking direction roll (degrees, about Y).
    pub stacking_roll: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            layer_ordering: LayerOrdering::ByHeight,
            grouping_tolerance: 0.01,
            stacking_pitch: 0.0,
            stacking_yaw: 0.0,
            stacking_roll: 0.0,
        }
    }
}

impl SchedulerConfig {
    /// Orientation of the shared stacking axis.
    pub fn orientation(&self) -> Orientation {
        Orientation::from_pitch_yaw_roll(
            self.stacking_pitch.to_radians(),
            self.stacking_yaw.to_radians(),
            self.stacking_roll.to_radians(),
        )
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.grouping_tolerance.is_finite() && self.grouping_tolerance >= 0.0) {
            return Err(SlicerError::InvalidSettings(
                "grouping_tolerance must be a non-negative distance".into(),
            ));
        }
        for (name, angle) in [
            ("stacking_pitch", self.stacking_pitch),
            ("stacking_yaw", self.stacking_yaw),
            ("stacking_roll", self.stacking_roll),
        ] {
            if !angle.is_finite() {
                return Err(SlicerError::InvalidSettings(format!("{name} must be finite")));
            }
        }
        Ok(())
    }
}

/// Per-region infill settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfillConfig {
    /// Fill pattern.
    pub pattern: InfillPatternKind,
    /// Distance between adjacent fill lines (mm).
    pub line_spacing: f64,
    /// Extruded bead width (mm).
    pub bead_width: f64,
    /// Fill angle for layer 0 (degrees).
    pub angle: f64,
    /// Added to the fill angle for every layer index (degrees).
    pub angle_rotation: f64,
    /// Fill across the printer's bed instead of the region's own bounds.
    pub based_on_printer: bool,
    /// Printer bed minimum corner (mm).
    pub printer_min: [f64; 2],
    /// Printer bed maximum corner (mm).
    pub printer_max: [f64; 2],
    /// Outward offset applied to the region before filling (mm).
    pub overlap: f64,
    /// Print speed (mm/s).
    pub speed: f64,
    /// Acceleration (mm/s²).
    pub acceleration: f64,
    /// Extruder screw speed (rev/s).
    pub extruder_speed: f64,
    /// Layer height stamped on segments (mm).
    pub layer_height: f64,
    /// Pivot for angular ordering and radial hatching (mm).
    pub center: [f64; 2],
    /// Reference direction that angles about the pivot are measured from.
    pub start_vector: [f64; 2],
    /// Angular span of a radial-hatch sector (degrees).
    pub sector_angle: f64,
}

impl Default for InfillConfig {
    fn default() -> Self {
        Self {
            pattern: InfillPatternKind::Lines,
            line_spacing: 2.0,
            bead_width: 0.45,
            angle: 45.0,
            angle_rotation: 0.0,
            based_on_printer: false,
            printer_min: [0.0, 0.0],
            printer_max: [220.0, 220.0],
            overlap: 0.0,
            speed: 60.0,
            acceleration: 1000.0,
            extruder_speed: 1.0,
            layer_height: 0.2,
            center: [0.0, 0.0],
            start_vector: [1.0, 0.0],
            sector_angle: 360.0,
        }
    }
}

impl InfillConfig {
    /// Pivot point.
    pub fn center(&self) -> Point2 {
        Point2::new(self.center[0], self.center[1])
    }

    /// Reference direction for angular ordering.
    pub fn start_vector(&self) -> Vec2 {
        Vec2::new(self.start_vector[0], self.start_vector[1])
    }

    /// Printer bed bounds as `(min, max)`.
    pub fn printer_bounds(&self) -> (Point2, Point2) {
        (
            Point2::new(self.printer_min[0], self.printer_min[1]),
            Point2::new(self.printer_max[0], self.printer_max[1]),
        )
    }

    /// Fill angle for a given layer, in radians.
    pub fn angle_for_layer(&self, layer_index: usize) -> f64 {
        (self.angle + self.angle_rotation * layer_index as f64).to_radians()
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.line_spacing > 0.0) {
            return Err(SlicerError::InvalidSettings(
                "line_spacing must be positive".into(),
            ));
        }
        if !(self.bead_width > 0.0) {
            return Err(SlicerError::InvalidSettings(
                "bead_width must be positive".into(),
            ));
        }
        if !(self.layer_height > 0.0) {
            return Err(SlicerError::InvalidSettings(
                "layer_height must be positive".into(),
            ));
        }
        if !self.overlap.is_finite() {
            return Err(SlicerError::InvalidSettings("overlap must be finite".into()));
        }
        if !(self.sector_angle > 0.0 && self.sector_angle <= 360.0) {
            return Err(SlicerError::InvalidSettings(
                "sector_angle must be in (0, 360] degrees".into(),
            ));
        }
        if self.start_vector().norm() == 0.0 {
            return Err(SlicerError::InvalidSettings(
                "start_vector must be non-zero".into(),
            ));
        }
        if self.based_on_printer
            && (self.printer_min[0] >= self.printer_max[0]
                || self.printer_min[1] >= self.printer_max[1])
        {
            return Err(SlicerError::InvalidSettings(
                "printer_min must be below printer_max".into(),
            ));
        }
        Ok(())
    }
}

/// Complete configuration for a scheduling + toolpath pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Global layer scheduling.
    pub scheduler: SchedulerConfig,
    /// Infill region synthesis.
    pub infill: InfillConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()?;
        self.infill.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml_str(
            r#"
            [scheduler]
            layer_ordering = "by-layer-number"
            grouping_tolerance = 0.05

            [infill]
            pattern = "radial-hatch"
            line_spacing = 1.5
            sector_angle = 90.0
            "#,
        )
        .unwrap();
        assert_eq!(config.scheduler.layer_ordering, LayerOrdering::ByLayerNumber);
        assert_eq!(config.infill.pattern, InfillPatternKind::RadialHatch);
        assert_eq!(config.infill.line_spacing, 1.5);
        // Untouched keys keep their defaults
        assert_eq!(config.infill.bead_width, 0.45);
    }

    #[test]
    fn test_unknown_ordering_is_rejected() {
        let err = Config::from_toml_str("[scheduler]\nlayer_ordering = \"by-color\"\n").unwrap_err();
        assert!(matches!(err, SlicerError::Config(_)));

        assert!(matches!(
            LayerOrdering::try_from(7),
            Err(SlicerError::UnknownLayerOrdering(7))
        ));
        assert_eq!(LayerOrdering::try_from(2).unwrap(), LayerOrdering::ByPart);
    }

    #[test]
    fn test_invalid_settings() {
        let mut config = Config::default();
        config.scheduler.grouping_tolerance = -0.1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.infill.line_spacing = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.infill.based_on_printer = true;
        config.infill.printer_max = [-1.0, 10.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_angle_rotation_per_layer() {
        let config = InfillConfig {
            angle: 0.0,
            angle_rotation: 90.0,
            ..Default::default()
        };
        assert!((config.angle_for_layer(1) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
