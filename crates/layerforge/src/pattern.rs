//! Fill pattern generation service.
//!
//! A [`PatternGenerator`] turns region geometry plus a [`Pattern`] into raw,
//! disjoint polylines covering the region. The region synthesizer consumes
//! them as-is and handles direction and ordering itself, so generators make
//! no promise about which way a polyline runs or in which order they come.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, TAU};

use layerforge_math::{Point2, Vec2, EPSILON};

use crate::path::{polygon_bounds, region_contains, Polygon, Polyline};

/// Area a line-family pattern is laid out over before clipping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillBounds {
    /// The region's own bounding box.
    Geometry,
    /// The printer bed, so lines line up across parts.
    Printer {
        /// Bed minimum corner.
        min: Point2,
        /// Bed maximum corner.
        max: Point2,
    },
}

/// A fill pattern and exactly the parameters it uses. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    /// Parallel lines.
    Lines {
        /// Line spacing (mm).
        spacing: f64,
        /// Line direction.
        angle: f64,
        /// Layout area.
        bounds: FillBounds,
    },
    /// Lines at `angle` and `angle + 90°`.
    Grid {
        /// Line spacing (mm).
        spacing: f64,
        /// First family direction.
        angle: f64,
        /// Layout area.
        bounds: FillBounds,
    },
    /// Rings stepping inward from the outline.
    Concentric {
        /// Bead width (mm); the outermost ring sits half of it inside.
        bead_width: f64,
        /// Ring spacing (mm).
        spacing: f64,
    },
    /// Lines at `angle`, `+60°` and `+120°`.
    Triangles {
        /// Line spacing (mm).
        spacing: f64,
        /// First family direction.
        angle: f64,
        /// Layout area.
        bounds: FillBounds,
    },
    /// Triangle families with the second and third shifted half a spacing.
    HexagonsAndTriangles {
        /// Line spacing (mm).
        spacing: f64,
        /// First family direction.
        angle: f64,
        /// Layout area.
        bounds: FillBounds,
    },
    /// Mirrored zigzag rows forming hexagonal cells.
    Honeycomb {
        /// Gap left between the shared flats of adjacent rows (mm).
        bead_width: f64,
        /// Cell side length (mm).
        spacing: f64,
        /// Row direction.
        angle: f64,
        /// Layout area.
        bounds: FillBounds,
    },
    /// Rays from a pivot across an angular sector.
    RadialHatch {
        /// Pivot the rays start from.
        center: Point2,
        /// Spacing between ray tips at the region's far edge (mm).
        spacing: f64,
        /// Angular span of the sector.
        sector_angle: f64,
        /// Direction of the first ray.
        angle: f64,
    },
}

/// Pure geometry service producing raw fill polylines.
pub trait PatternGenerator: Send + Sync {
    /// Fill `geometry` with `pattern`. Empty geometry yields no polylines.
    fn generate(&self, geometry: &[Polygon], pattern: &Pattern) -> Vec<Polyline>;
}

/// Default generator: scanline families clipped against the region with
/// even-odd containment, inward offsets for concentric rings and pivot
/// rays for radial hatching.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanlineGenerator;

impl PatternGenerator for ScanlineGenerator {
    fn generate(&self, geometry: &[Polygon], pattern: &Pattern) -> Vec<Polyline> {
        if geometry.is_empty() {
            return Vec::new();
        }

        match *pattern {
            Pattern::Lines {
                spacing,
                angle,
                bounds,
            } => line_families(geometry, spacing, &[(angle, 0.0)], bounds),
            Pattern::Grid {
                spacing,
                angle,
                bounds,
            } => line_families(
                geometry,
                spacing,
                &[(angle, 0.0), (angle + FRAC_PI_2, 0.0)],
                bounds,
            ),
            Pattern::Triangles {
                spacing,
                angle,
                bounds,
            } => line_families(
                geometry,
                spacing,
                &[
                    (angle, 0.0),
                    (angle + FRAC_PI_3, 0.0),
                    (angle + 2.0 * FRAC_PI_3, 0.0),
                ],
                bounds,
            ),
            Pattern::HexagonsAndTriangles {
                spacing,
                angle,
                bounds,
            } => line_families(
                geometry,
                spacing,
                &[
                    (angle, 0.0),
                    (angle + FRAC_PI_3, 0.5),
                    (angle + 2.0 * FRAC_PI_3, 0.5),
                ],
                bounds,
            ),
            Pattern::Honeycomb {
                bead_width,
                spacing,
                angle,
                bounds,
            } => honeycomb(geometry, bead_width, spacing, angle, bounds),
            Pattern::Concentric {
                bead_width,
                spacing,
            } => concentric(geometry, bead_width, spacing),
            Pattern::RadialHatch {
                center,
                spacing,
                sector_angle,
                angle,
            } => radial_hatch(geometry, center, spacing, sector_angle, angle),
        }
    }
}

/// Orthonormal frame: `u` runs along the pattern direction, `v` across it.
#[derive(Debug, Clone, Copy)]
struct Frame {
    dir: Vec2,
    perp: Vec2,
}

impl Frame {
    fn new(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            dir: Vec2::new(c, s),
            perp: Vec2::new(-s, c),
        }
    }

    fn to_world(&self, u: f64, v: f64) -> Point2 {
        Point2::from(self.dir * u + self.perp * v)
    }

    /// Extent of a box in frame coordinates as `(u_min, u_max, v_min, v_max)`.
    fn extent(&self, min: &Point2, max: &Point2) -> (f64, f64, f64, f64) {
        let corners = [
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        ];
        let mut ext = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for corner in &corners {
            let u = corner.coords.dot(&self.dir);
            let v = corner.coords.dot(&self.perp);
            ext.0 = ext.0.min(u);
            ext.1 = ext.1.max(u);
            ext.2 = ext.2.min(v);
            ext.3 = ext.3.max(v);
        }
        ext
    }
}

fn layout_box(geometry: &[Polygon], bounds: FillBounds) -> Option<(Point2, Point2)> {
    match bounds {
        FillBounds::Geometry => polygon_bounds(geometry),
        FillBounds::Printer { min, max } => Some((min, max)),
    }
}

/// Scanline families, one `(angle, phase)` per family. `phase` shifts the
/// family's lines by that fraction of the spacing.
fn line_families(
    geometry: &[Polygon],
    spacing: f64,
    families: &[(f64, f64)],
    bounds: FillBounds,
) -> Vec<Polyline> {
    let Some((min, max)) = layout_box(geometry, bounds) else {
        return Vec::new();
    };
    if spacing <= 0.0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for &(angle, phase) in families {
        let frame = Frame::new(angle);
        let (u_min, u_max, v_min, v_max) = frame.extent(&min, &max);

        let mut v = v_min + spacing * (0.5 + phase);
        while v < v_max {
            let a = frame.to_world(u_min - spacing, v);
            let b = frame.to_world(u_max + spacing, v);
            lines.extend(clip_polyline(&[a, b], geometry));
            v += spacing;
        }
    }
    lines
}

fn honeycomb(
    geometry: &[Polygon],
    bead_width: f64,
    side: f64,
    angle: f64,
    bounds: FillBounds,
) -> Vec<Polyline> {
    let Some((min, max)) = layout_box(geometry, bounds) else {
        return Vec::new();
    };
    if side <= 0.0 {
        return Vec::new();
    }

    let frame = Frame::new(angle);
    let (u_min, u_max, v_min, v_max) = frame.extent(&min, &max);
    let h = side * 3.0_f64.sqrt() / 2.0;
    let pitch = h + bead_width.max(0.0);
    let period = 3.0 * side;
    let u_start = (u_min / period).floor() * period - period;

    let mut lines = Vec::new();
    let first_row = ((v_min - h) / pitch).floor() as i64;
    let last_row = (v_max / pitch).ceil() as i64;
    for row in first_row..=last_row {
        let base = row as f64 * pitch;
        let (low, high) = if row.rem_euclid(2) == 0 {
            (base, base + h)
        } else {
            (base + h, base)
        };

        let mut points = Vec::new();
        let mut u = u_start;
        while u <= u_max + period {
            points.push(frame.to_world(u, low));
            points.push(frame.to_world(u + side, low));
            points.push(frame.to_world(u + 1.5 * side, high));
            points.push(frame.to_world(u + 2.5 * side, high));
            u += period;
        }
        lines.extend(clip_polyline(&points, geometry));
    }
    lines
}

fn concentric(geometry: &[Polygon], bead_width: f64, spacing: f64) -> Vec<Polyline> {
    if spacing <= 0.0 {
        return Vec::new();
    }

    let mut rings = Vec::new();
    for (i, outline) in geometry.iter().enumerate() {
        let is_hole = outline.points.first().is_some_and(|probe| {
            geometry
                .iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.contains(probe))
                .count()
                % 2
                == 1
        });
        // Holes grow away from their loop, outer loops shrink
        let sign = if is_hole { -1.0 } else { 1.0 };

        let mut distance = bead_width / 2.0;
        while let Some(ring) = outline.offset(sign * distance) {
            if !ring.points.iter().all(|p| region_contains(geometry, p)) {
                break;
            }
            let mut points = ring.points;
            if let Some(&first) = points.first() {
                points.push(first);
            }
            rings.push(Polyline::new(points));
            distance += spacing;
        }
    }
    rings
}

fn radial_hatch(
    geometry: &[Polygon],
    center: Point2,
    spacing: f64,
    sector_angle: f64,
    angle: f64,
) -> Vec<Polyline> {
    let radius = geometry
        .iter()
        .flat_map(|p| p.points.iter())
        .map(|p| (p - center).norm())
        .fold(0.0, f64::max);
    if radius < EPSILON || spacing <= 0.0 || sector_angle <= 0.0 {
        return Vec::new();
    }

    let step = spacing / radius;
    let full_turn = sector_angle >= TAU - EPSILON;
    let span = sector_angle.min(TAU);
    let mut count = (span / step).floor() as usize;
    if !full_turn {
        count += 1;
    }

    let reach = radius * 1.01;
    (0..count)
        .flat_map(|k| {
            let theta = angle + k as f64 * step;
            let tip = center + Vec2::new(theta.cos(), theta.sin()) * reach;
            clip_polyline(&[center, tip], geometry)
        })
        .collect()
}

/// Parameter intervals of segment `a→b` that lie inside the region.
fn inside_intervals(a: &Point2, b: &Point2, region: &[Polygon]) -> Vec<(f64, f64)> {
    let d = b - a;
    let mut ts = vec![0.0, 1.0];

    for poly in region {
        let n = poly.points.len();
        for i in 0..n {
            let p = poly.points[i];
            let e = poly.points[(i + 1) % n] - p;

            let cross = d.x * e.y - d.y * e.x;
            if cross.abs() < EPSILON {
                continue;
            }

            let w = p - a;
            let t = (w.x * e.y - w.y * e.x) / cross;
            let s = (w.x * d.y - w.y * d.x) / cross;
            if (0.0..=1.0).contains(&s) && t > 0.0 && t < 1.0 {
                ts.push(t);
            }
        }
    }

    ts.sort_by(f64::total_cmp);
    ts.dedup_by(|x, y| (*x - *y).abs() < 1e-12);

    let mut intervals: Vec<(f64, f64)> = Vec::new();
    for w in ts.windows(2) {
        let (t0, t1) = (w[0], w[1]);
        if t1 - t0 < 1e-9 {
            continue;
        }
        let mid = a + d * ((t0 + t1) / 2.0);
        if !region_contains(region, &mid) {
            continue;
        }
        match intervals.last_mut() {
            Some(last) if (last.1 - t0).abs() < 1e-12 => last.1 = t1,
            _ => intervals.push((t0, t1)),
        }
    }
    intervals
}

/// Clip an open polyline to the region, joining pieces that stay inside
/// across vertices.
fn clip_polyline(points: &[Point2], region: &[Polygon]) -> Vec<Polyline> {
    let mut pieces = Vec::new();
    let mut current: Vec<Point2> = Vec::new();
    let mut open = false;

    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let d = b - a;
        let mut reached_end = false;

        for (t0, t1) in inside_intervals(&a, &b, region) {
            let p0 = a + d * t0;
            let p1 = a + d * t1;
            if !(open && t0 <= 1e-12) {
                if current.len() >= 2 {
                    pieces.push(Polyline::new(std::mem::take(&mut current)));
                }
                current = vec![p0];
            }
            current.push(p1);
            open = false;
            reached_end = t1 >= 1.0 - 1e-12;
        }
        open = reached_end;
    }

    if current.len() >= 2 {
        pieces.push(Polyline::new(current));
    }
    pieces
}
