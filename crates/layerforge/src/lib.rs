#![warn(missing_docs)]

//! Multi-part layer scheduling and infill toolpath synthesis.
//!
//! Parts sliced independently each carry their own stack of steps. This
//! crate merges those stacks into global layers (one synchronized print
//! pass across parts) and turns each step's infill region into ordered,
//! attribute-stamped motion paths.
//!
//! # Example
//!
//! ```ignore
//! use layerforge::{compute_global_layer, schedule, Config, PlainWriter, ScanlineGenerator};
//!
//! let config = Config::load("job.toml")?;
//! let layers = schedule(&parts, &config.scheduler)?;
//!
//! for layer in &layers {
//!     for job in compute_global_layer(layer, &parts, &config.infill, &ScanlineGenerator) {
//!         print!("{}", job.sector.write_gcode(&PlainWriter));
//!     }
//! }
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod infill;
pub mod layer;
pub mod part;
pub mod path;
pub mod pattern;
pub mod pipeline;
pub mod schedule;
pub mod writer;

pub use config::{Config, InfillConfig, InfillPatternKind, LayerOrdering, SchedulerConfig};
pub use diagnostics::{append_global_layer_log, write_global_layers};
pub use error::{Result, SlicerError};
pub use infill::{normalize_direction, uniform, InfillSector};
pub use layer::GlobalLayer;
pub use part::{BuildPart, Part, PartId, Step, StepPair};
pub use path::{Path, Polygon, Polyline, RegionType, Segment, SegmentSettings};
pub use pattern::{FillBounds, Pattern, PatternGenerator, ScanlineGenerator};
pub use pipeline::{compute_global_layer, SectorJob};
pub use schedule::{populate_step, schedule};
pub use writer::{PlainWriter, Writer};
