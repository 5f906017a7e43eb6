//! Infill region path synthesis.
//!
//! An [`InfillSector`] owns a private copy of one region's outline and turns
//! it into an ordered list of printable [`Path`]s:
//!
//! 1. grow the region by the configured overlap,
//! 2. ask a [`PatternGenerator`] for raw polylines,
//! 3. orient each polyline so it runs counter-clockwise about the pivot,
//! 4. reverse the list and flip every second polyline ([`uniform`]),
//! 5. stamp each polyline into a [`Path`] with the region's settings.
//!
//! A sector is either uncomputed or holds the output of its most recent
//! [`InfillSector::compute`] call.

use std::f64::consts::TAU;

use layerforge_math::{ccw_angle, Point2, Vec2};

use crate::config::{InfillConfig, InfillPatternKind};
use crate::path::{grow_region, Path, Polygon, Polyline, RegionType, SegmentSettings};
use crate::pattern::{FillBounds, Pattern, PatternGenerator};
use crate::writer::Writer;

/// One infill region of one step.
#[derive(Debug, Clone)]
pub struct InfillSector {
    index: usize,
    geometry: Vec<Polygon>,
    sector_angle: f64,
    start_vector: Vec2,
    layer_height: Option<f64>,
    paths: Option<Vec<Path>>,
    radial_keys: Vec<f64>,
}

impl InfillSector {
    /// Create an uncomputed sector over its own copy of `geometry`.
    pub fn new(index: usize, geometry: Vec<Polygon>) -> Self {
        Self {
            index,
            geometry,
            sector_angle: TAU,
            start_vector: Vec2::x(),
            layer_height: None,
            paths: None,
            radial_keys: Vec::new(),
        }
    }

    /// Angular span used by radial hatching (radians).
    pub fn with_sector_angle(mut self, sector_angle: f64) -> Self {
        self.sector_angle = sector_angle;
        self
    }

    /// Reference direction angles about the pivot are measured from.
    pub fn with_start_vector(mut self, start_vector: Vec2) -> Self {
        self.start_vector = start_vector;
        self
    }

    /// Height stamped on segments, overriding the configured layer height.
    ///
    /// Set from the step being filled so segments match the layer the
    /// scheduler placed.
    pub fn with_layer_height(mut self, layer_height: f64) -> Self {
        self.layer_height = Some(layer_height);
        self
    }

    /// Region index within its step.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Outline the sector fills.
    pub fn geometry(&self) -> &[Polygon] {
        &self.geometry
    }

    /// Whether [`compute`](Self::compute) has run.
    pub fn is_computed(&self) -> bool {
        self.paths.is_some()
    }

    /// Paths from the last compute, in print order. Empty when uncomputed.
    pub fn paths(&self) -> &[Path] {
        self.paths.as_deref().unwrap_or(&[])
    }

    /// Distance from the pivot to each polyline's first point, taken after
    /// direction normalization, aligned with [`paths`](Self::paths).
    pub fn radial_keys(&self) -> &[f64] {
        &self.radial_keys
    }

    /// Replace any previous output with fresh paths for `layer_index`.
    pub fn compute<G>(&mut self, layer_index: usize, config: &InfillConfig, generator: &G)
    where
        G: PatternGenerator + ?Sized,
    {
        self.paths = None;
        self.radial_keys.clear();

        let pivot = config.center();
        let bounds = if config.based_on_printer {
            let (min, max) = config.printer_bounds();
            FillBounds::Printer { min, max }
        } else {
            FillBounds::Geometry
        };

        let region = grow_region(&self.geometry, config.overlap);
        let pattern = self.pattern(layer_index, config, pivot, bounds);

        let mut lines = generator.generate(&region, &pattern);
        lines.retain(|line| line.len() >= 2);
        for line in &mut lines {
            normalize_direction(line, &pivot, &self.start_vector);
        }

        let mut keys: Vec<f64> = lines
            .iter()
            .map(|line| line.start().map_or(0.0, |p| (p - pivot).norm()))
            .collect();

        lines.reverse();
        keys.reverse();
        uniform(&mut lines);

        let paths: Vec<Path> = lines
            .iter()
            .map(|line| self.create_path(line, config))
            .collect();

        log::debug!(
            "sector {} layer {}: {:?} -> {} paths",
            self.index,
            layer_index,
            config.pattern,
            paths.len()
        );

        self.radial_keys = keys;
        self.paths = Some(paths);
    }

    /// Turn a polyline into a path whose segments carry this region's
    /// current settings.
    pub fn create_path(&self, line: &Polyline, config: &InfillConfig) -> Path {
        let mut settings = segment_settings(config);
        if let Some(height) = self.layer_height {
            settings.height = height;
        }
        Path::from_polyline(line, settings)
    }

    /// Emit the region through `writer`.
    ///
    /// The region's motion is bracketed once: before-region header, every
    /// path's moves, then a single after-path trailer. A region with no
    /// paths, computed or not, emits only the writer's empty-step marker.
    pub fn write_gcode(&self, writer: &dyn Writer) -> String {
        let paths = self.paths();
        if paths.iter().all(Path::is_empty) {
            return writer.write_empty_step();
        }

        let region = RegionType::Infill;
        let mut out = writer.write_before_region(region, paths.len());
        for path in paths.iter().filter(|p| !p.is_empty()) {
            out.push_str(&writer.write_travel(&path.segments[0].start));
            for segment in &path.segments {
                out.push_str(&writer.write_segment(segment));
            }
        }
        out.push_str(&writer.write_after_path(region));
        out
    }

    fn pattern(
        &self,
        layer_index: usize,
        config: &InfillConfig,
        pivot: Point2,
        bounds: FillBounds,
    ) -> Pattern {
        let spacing = config.line_spacing;
        let angle = config.angle_for_layer(layer_index);

        match config.pattern {
            InfillPatternKind::Lines => Pattern::Lines {
                spacing,
                angle,
                bounds,
            },
            InfillPatternKind::Grid => Pattern::Grid {
                spacing,
                angle,
                bounds,
            },
            InfillPatternKind::Concentric => Pattern::Concentric {
                bead_width: config.bead_width,
                spacing,
            },
            InfillPatternKind::Triangles => Pattern::Triangles {
                spacing,
                angle,
                bounds,
            },
            InfillPatternKind::HexagonsAndTriangles => Pattern::HexagonsAndTriangles {
                spacing,
                angle,
                bounds,
            },
            InfillPatternKind::Honeycomb => Pattern::Honeycomb {
                bead_width: config.bead_width,
                spacing,
                angle,
                bounds,
            },
            InfillPatternKind::RadialHatch => Pattern::RadialHatch {
                center: pivot,
                spacing,
                sector_angle: self.sector_angle,
                angle,
            },
        }
    }
}

/// Reverse every second polyline (indices 1, 3, ...) in place.
///
/// Applying it twice restores the original point order.
pub fn uniform(lines: &mut [Polyline]) {
    for line in lines.iter_mut().skip(1).step_by(2) {
        line.reverse();
    }
}

/// Flip `line` if its last point sits at a smaller angle about `pivot`
/// than its first.
pub fn normalize_direction(line: &mut Polyline, pivot: &Point2, reference: &Vec2) {
    let (Some(first), Some(last)) = (line.start(), line.end()) else {
        return;
    };
    if ccw_angle(last, pivot, reference) < ccw_angle(first, pivot, reference) {
        line.reverse();
    }
}

fn segment_settings(config: &InfillConfig) -> SegmentSettings {
    SegmentSettings {
        width: config.bead_width,
        height: config.layer_height,
        speed: config.speed,
        acceleration: config.acceleration,
        extruder_speed: config.extruder_speed,
        region_type: RegionType::Infill,
    }
}
