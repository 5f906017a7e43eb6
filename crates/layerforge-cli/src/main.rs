//! layerforge CLI - schedule multi-part jobs and emit infill toolpaths.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layerforge::{
    append_global_layer_log, compute_global_layer, schedule, GlobalLayer, Part, PlainWriter,
    ScanlineGenerator,
};

mod job;

use job::Job;

#[derive(Parser)]
#[command(name = "layerforge")]
#[command(about = "Multi-part layer scheduler and infill toolpath generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every part's steps into global layers and print them
    Schedule {
        /// Job file (.toml)
        job: PathBuf,
        /// Print the layers as JSON
        #[arg(long)]
        json: bool,
        /// Also append a plain-text dump of the layers to this file
        #[arg(long, value_name = "FILE")]
        log: Option<PathBuf>,
    },
    /// Schedule the job and write infill moves for every layer
    Toolpath {
        /// Job file (.toml)
        job: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schedule {
            job,
            json,
            log: log_file,
        } => {
            let job = Job::load(&job)?;
            let parts = job.build_parts();
            let layers = schedule(&parts, &job.config.scheduler)?;

            if let Some(path) = log_file {
                append_global_layer_log(&path, &layers, &parts)
                    .with_context(|| format!("appending layer log to {}", path.display()))?;
            }

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &layers)?;
                writeln!(out)?;
            } else {
                print_layer_table(&mut out, &layers)?;
            }
        }
        Commands::Toolpath { job } => {
            let job = Job::load(&job)?;
            let parts = job.build_parts();
            let layers = schedule(&parts, &job.config.scheduler)?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_toolpaths(&mut out, &layers, &parts, &job)?;
        }
    }

    Ok(())
}

fn print_layer_table(out: &mut impl Write, layers: &[GlobalLayer]) -> Result<()> {
    writeln!(out, "{:>6}  parts (id:step)", "layer")?;
    for layer in layers {
        let entries: Vec<String> = layer
            .step_pairs()
            .iter()
            .map(|(id, step)| format!("{id}:{step}"))
            .collect();
        writeln!(out, "{:>6}  {}", layer.index(), entries.join(" "))?;
    }
    Ok(())
}

fn write_toolpaths(
    out: &mut impl Write,
    layers: &[GlobalLayer],
    parts: &[Part],
    job: &Job,
) -> Result<()> {
    let mut sectors = 0;
    for layer in layers {
        writeln!(out, "; GLOBAL LAYER {}", layer.index())?;
        for computed in compute_global_layer(layer, parts, &job.config.infill, &ScanlineGenerator) {
            writeln!(out, "; PART {} STEP {}", computed.part, computed.step_index)?;
            out.write_all(computed.sector.write_gcode(&PlainWriter).as_bytes())?;
            sectors += 1;
        }
    }
    log::info!("wrote {} sectors across {} global layers", sectors, layers.len());
    Ok(())
}
