//! Plain-text dump of scheduled global layers.
//!
//! Debugging aid only. Nothing in scheduling or synthesis reads it back.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::error::Result;
use crate::layer::GlobalLayer;
use crate::part::BuildPart;

/// Write every layer's per-part entries to `out`.
///
/// Entries whose handle no longer resolves are reported as missing and
/// logged as a warning; the dump carries on with the next entry.
pub fn write_global_layers<P: BuildPart>(
    layers: &[GlobalLayer],
    parts: &[P],
    mut out: impl Write,
) -> io::Result<()> {
    writeln!(out, "Logging global_layers content:")?;
    for layer in layers {
        writeln!(out, "Global Layer {}:", layer.index())?;
        for (&id, &step_index) in layer.step_pairs() {
            let step_pair = parts
                .iter()
                .find(|p| p.id() == id)
                .and_then(|p| p.step_pair(step_index));
            match step_pair {
                Some(sp) => writeln!(
                    out,
                    "  Part {}: printing layer present (step {}, {} loops)",
                    id,
                    step_index,
                    sp.printing_layer.geometry.len()
                )?,
                None => {
                    log::warn!(
                        "global layer {}: part {} step {} is missing",
                        layer.index(),
                        id,
                        step_index
                    );
                    writeln!(out, "  Part {}: printing layer missing (step {})", id, step_index)?
                }
            }
        }
    }
    writeln!(out, "End of global_layers log")?;
    Ok(())
}

/// Append the dump to the file at `path`, creating it if needed.
pub fn append_global_layer_log<P: BuildPart>(
    path: impl AsRef<Path>,
    layers: &[GlobalLayer],
    parts: &[P],
) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut out = io::BufWriter::new(file);
    write_global_layers(layers, parts, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::{Part, PartId, Step};
    use layerforge_math::Plane;

    fn part_with_steps(id: u32, count: usize) -> Part {
        let mut part = Part::new(PartId(id));
        for i in 0..count {
            part.push_step_pair(Step {
                slicing_plane: Plane::horizontal(i as f64 * 0.2),
                layer_height: 0.2,
                geometry: Vec::new(),
            });
        }
        part
    }

    #[test]
    fn test_dump_format() {
        let parts = vec![part_with_steps(1, 1)];
        let mut layer = GlobalLayer::new(0);
        layer.add_step_pair(PartId(1), 0).unwrap();
        layer.add_step_pair(PartId(2), 0).unwrap();

        let mut buf = Vec::new();
        write_global_layers(&[layer], &parts, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "Logging global_layers content:\n\
             Global Layer 0:\n  \
             Part 1: printing layer present (step 0, 0 loops)\n  \
             Part 2: printing layer missing (step 0)\n\
             End of global_layers log\n"
        );
    }

    #[test]
    fn test_append_accumulates() {
        let dir = std::env::temp_dir().join(format!("layerforge-diag-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("global_layers.log");
        let _ = std::fs::remove_file(&path);

        let parts = vec![part_with_steps(1, 2)];
        let layers = vec![GlobalLayer::new(0)];
        append_global_layer_log(&path, &layers, &parts).unwrap();
        append_global_layer_log(&path, &layers, &parts).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("Logging global_layers content:").count(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
