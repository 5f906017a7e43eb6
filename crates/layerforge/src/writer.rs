//! Textual output hooks for computed regions.
//!
//! Regions do not format machine instructions themselves; they walk their
//! paths and ask a [`Writer`] for the text of each piece.

use layerforge_math::Point2;

use crate::path::{RegionType, Segment};

/// Formats the pieces of a region's output.
pub trait Writer {
    /// Header emitted once before a non-empty region.
    fn write_before_region(&self, region: RegionType, path_count: usize) -> String;

    /// Non-printing move to the start of the next path.
    fn write_travel(&self, to: &Point2) -> String;

    /// One printing move.
    fn write_segment(&self, segment: &Segment) -> String;

    /// Trailer emitted once, after the region's last path.
    fn write_after_path(&self, region: RegionType) -> String;

    /// Marker emitted in place of a region that has nothing to print.
    fn write_empty_step(&self) -> String;
}

/// Minimal G-code-like writer: `G0`/`G1` moves and `;` comment markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainWriter;

impl Writer for PlainWriter {
    fn write_before_region(&self, region: RegionType, path_count: usize) -> String {
        format!("; BEGIN {} ({} paths)\n", region.label(), path_count)
    }

    fn write_travel(&self, to: &Point2) -> String {
        format!("G0 X{:.3} Y{:.3}\n", to.x, to.y)
    }

    fn write_segment(&self, segment: &Segment) -> String {
        let s = &segment.settings;
        // Feed rate in mm/min
        format!(
            "G1 X{:.3} Y{:.3} F{:.0} ; W{:.3} H{:.3} A{:.0} E{:.3}\n",
            segment.end.x,
            segment.end.y,
            s.speed * 60.0,
            s.width,
            s.height,
            s.acceleration,
            s.extruder_speed,
        )
    }

    fn write_after_path(&self, region: RegionType) -> String {
        format!("; END PATH {}\n", region.label())
    }

    fn write_empty_step(&self) -> String {
        "; EMPTY STEP\n".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::SegmentSettings;

    #[test]
    fn test_plain_writer_segment() {
        let segment = Segment {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(1.5, 2.25),
            settings: SegmentSettings {
                width: 0.45,
                height: 0.2,
                speed: 60.0,
                acceleration: 1000.0,
                extruder_speed: 1.0,
                region_type: RegionType::Infill,
            },
        };
        let line = PlainWriter.write_segment(&segment);
        assert!(line.starts_with("G1 X1.500 Y2.250 F3600"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_plain_writer_markers() {
        assert_eq!(
            PlainWriter.write_before_region(RegionType::Infill, 3),
            "; BEGIN infill (3 paths)\n"
        );
        assert_eq!(PlainWriter.write_empty_step(), "; EMPTY STEP\n");
    }
}
