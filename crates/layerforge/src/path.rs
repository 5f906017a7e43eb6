//! Polygon, polyline and motion path types.

use layerforge_math::Point2;
use serde::{Deserialize, Serialize};

/// A 2D polygon (closed loop).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Vertices of the polygon in order.
    pub points: Vec<Point2>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle from two corners, counter-clockwise.
    pub fn rectangle(min: Point2, max: Point2) -> Self {
        Self::new(vec![
            min,
            Point2::new(max.x, min.y),
            max,
            Point2::new(min.x, max.y),
        ])
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Signed area of the polygon.
    /// Positive for counter-clockwise, negative for clockwise.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area / 2.0
    }

    /// Is the polygon counter-clockwise?
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Whether `point` lies inside the loop (crossing-number test).
    pub fn contains(&self, point: &Point2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = &self.points[i];
            let pj = &self.points[j];
            if ((pi.y > point.y) != (pj.y > point.y))
                && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Move every edge toward the loop's interior by `distance`.
    ///
    /// Works for either winding: positive distances shrink the enclosed
    /// area, negative ones grow it. Returns `None` if the loop collapses.
    pub fn offset(&self, distance: f64) -> Option<Self> {
        if self.points.len() < 3 {
            return None;
        }

        let n = self.points.len();
        let sign = if self.is_ccw() { 1.0 } else { -1.0 };
        let max_offset = distance.abs() * 2.0;
        let mut offset_points = Vec::with_capacity(n);

        for i in 0..n {
            let p0 = self.points[(i + n - 1) % n];
            let p1 = self.points[i];
            let p2 = self.points[(i + 1) % n];

            let e1 = (p1 - p0).normalize();
            let e2 = (p2 - p1).normalize();

            // Left-hand normals point inward for CCW loops, right-hand for CW
            let n1 = Point2::new(-e1.y * sign, e1.x * sign);
            let n2 = Point2::new(-e2.y * sign, e2.x * sign);
            let bisector = (n1.coords + n2.coords).normalize();

            // Stretch along the bisector so edges move by `distance`
            let dot = n1.coords.dot(&bisector);
            let offset_dist = if dot.abs() > 0.001 {
                distance / dot
            } else {
                distance
            };
            let clamped = offset_dist.clamp(-max_offset, max_offset);

            offset_points.push(Point2::new(
                p1.x + bisector.x * clamped,
                p1.y + bisector.y * clamped,
            ));
        }

        let result = Polygon::new(offset_points);
        let area = result.signed_area().abs();
        let collapsed = area < 1e-10
            || result.is_ccw() != self.is_ccw()
            || (distance > 0.0 && area >= self.signed_area().abs())
            || result.points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite());
        if collapsed {
            return None;
        }
        Some(result)
    }
}

/// Bounding box of a polygon set as `(min, max)`, or `None` when empty.
pub fn polygon_bounds(polygons: &[Polygon]) -> Option<(Point2, Point2)> {
    let mut points = polygons.iter().flat_map(|p| p.points.iter());
    let first = points.next()?;
    let (mut min, mut max) = (*first, *first);
    for pt in points {
        min.x = min.x.min(pt.x);
        min.y = min.y.min(pt.y);
        max.x = max.x.max(pt.x);
        max.y = max.y.max(pt.y);
    }
    Some((min, max))
}

/// Even-odd containment against a polygon set (outer loops and holes alike).
pub fn region_contains(polygons: &[Polygon], point: &Point2) -> bool {
    polygons.iter().filter(|p| p.contains(point)).count() % 2 == 1
}

/// Grow a region (outer loops with their holes) outward by `distance`.
///
/// A loop nested inside an odd number of other loops is a hole and
/// shrinks; everything else expands. Holes that close up disappear.
pub fn grow_region(polygons: &[Polygon], distance: f64) -> Vec<Polygon> {
    if distance == 0.0 {
        return polygons.to_vec();
    }

    polygons
        .iter()
        .enumerate()
        .filter_map(|(i, poly)| {
            let depth = poly
                .points
                .first()
                .map(|probe| {
                    polygons
                        .iter()
                        .enumerate()
                        .filter(|(j, other)| *j != i && other.contains(probe))
                        .count()
                })
                .unwrap_or(0);
            let is_hole = depth % 2 == 1;
            poly.offset(if is_hole { distance } else { -distance })
        })
        .collect()
}

/// An open polyline (non-closed path).
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    /// Points along the path.
    pub points: Vec<Point2>,
}

impl Polyline {
    /// Create a new polyline.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Total length of the polyline.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }

    /// Starting point.
    pub fn start(&self) -> Option<&Point2> {
        self.points.first()
    }

    /// Ending point.
    pub fn end(&self) -> Option<&Point2> {
        self.points.last()
    }

    /// Copy with the point order flipped.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Flip the point order in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

/// What kind of region a segment was printed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionType {
    /// Interior fill.
    Infill,
}

impl RegionType {
    /// Lowercase label used in writer output.
    pub fn label(&self) -> &'static str {
        match self {
            RegionType::Infill => "infill",
        }
    }
}

/// Attributes stamped on every segment of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSettings {
    /// Bead width (mm).
    pub width: f64,
    /// Layer height (mm).
    pub height: f64,
    /// Print speed (mm/s).
    pub speed: f64,
    /// Acceleration (mm/s²).
    pub acceleration: f64,
    /// Extruder speed (rev/s).
    pub extruder_speed: f64,
    /// Owning region type.
    pub region_type: RegionType,
}

/// A straight printing move.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Start point.
    pub start: Point2,
    /// End point.
    pub end: Point2,
    /// Resolved attributes, owned by the segment.
    pub settings: SegmentSettings,
}

impl Segment {
    /// Segment length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// An ordered run of segments printed without interruption.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    /// Segments in print order.
    pub segments: Vec<Segment>,
}

impl Path {
    /// Build a path from a polyline: each consecutive point pair becomes
    /// a segment carrying a copy of `settings`.
    pub fn from_polyline(line: &Polyline, settings: SegmentSettings) -> Self {
        let segments = line
            .points
            .windows(2)
            .map(|w| Segment {
                start: w[0],
                end: w[1],
                settings,
            })
            .collect();
        Self { segments }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Printed length.
    pub fn length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }
}
