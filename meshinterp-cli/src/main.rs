//! meshinterp CLI
//!
//! Checks how well the square-mesh interpolation preserves multicluster
//! energy and barycenters.
#![allow(
    clippy::uninlined_format_args,
    clippy::too_many_lines
)]

mod report;

use clap::{Parser, Subcommand};

use meshinterp_algorithms::{run_events, InterpolationConfig, InterpolationEngine, ReportConfig};
use meshinterp_core::{CachedTableProvider, EventHits};
use meshinterp_io::{load_square_mesh, EventTable, FileTableProvider, TableLayout};
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    MeshinterpIo(#[from] meshinterp_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] meshinterp_core::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("event {0} not found")]
    UnknownEvent(u64),
}

/// Hexagonal-to-square mesh interpolation checker.
#[derive(Parser)]
#[command(name = "meshinterp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Table location and mesh parameters shared by the subcommands.
#[derive(clap::Args)]
struct MeshArgs {
    /// Directory holding sq_cells_data/ and hex_pos_data/
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Square mesh resolution (columns, rows)
    #[arg(long, num_args = 2, value_names = ["COLUMNS", "ROWS"], default_values_t = [514, 513])]
    resolution: Vec<u32>,

    /// Square cell edge length
    #[arg(long, default_value = "0.7")]
    edge_length: f64,

    /// Number of nominal layers to walk
    #[arg(long, default_value = "40")]
    total_layers: u32,
}

impl MeshArgs {
    fn layout(&self) -> TableLayout {
        let (columns, rows) = match self.resolution.as_slice() {
            &[columns, rows] => (columns, rows),
            _ => TableLayout::default().resolution,
        };
        TableLayout::new(&self.data)
            .with_resolution(columns, rows)
            .with_edge_length(self.edge_length)
    }

    fn config(&self) -> InterpolationConfig {
        InterpolationConfig::new().with_total_layers(self.total_layers)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare hex and square mesh properties for every multicluster
    Check {
        /// Event table (JSON)
        events: PathBuf,

        #[command(flatten)]
        mesh: MeshArgs,

        /// Worker threads (0 = one per core)
        #[arg(short, long, default_value = "0")]
        threads: usize,

        /// Histogram bins per panel
        #[arg(long, default_value = "50")]
        bins: usize,

        /// Barycenter x/y difference above which a cluster is listed
        #[arg(long, default_value = "0.02")]
        threshold: f64,
    },

    /// Show information about an event table
    Info {
        /// Event table (JSON)
        events: PathBuf,
    },

    /// Per-layer energy totals of a single event
    Layer {
        /// Event table (JSON)
        events: PathBuf,

        /// Event to inspect
        #[arg(short, long)]
        event: u64,

        /// Only these layers (default: all)
        #[arg(short, long)]
        layers: Vec<u32>,

        #[command(flatten)]
        mesh: MeshArgs,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            events,
            mesh,
            threads,
            bins,
            threshold,
        } => {
            let start = Instant::now();
            let layout = mesh.layout();
            let report_config = ReportConfig::default()
                .with_bins(bins)
                .with_outlier_threshold(threshold);

            let square_mesh = load_square_mesh(&layout)?;
            log::info!(
                "square mesh {}x{} (edge {}): {} cells",
                layout.resolution.0,
                layout.resolution.1,
                layout.edge_length,
                square_mesh.len()
            );
            let provider = CachedTableProvider::new(FileTableProvider::new(layout));
            let engine = InterpolationEngine::new(&square_mesh, &provider, mesh.config())?;

            let table = EventTable::open(&events)?;
            log::info!("{} events read from {}", table.len(), events.display());

            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            let mut aggregator = run_events(&engine, table.events(), &pool)?;
            for (event_id, e) in table.rejected() {
                aggregator.record_failure(*event_id, e);
            }

            log::info!(
                "processed {} events in {:.2}s ({} layers loaded)",
                table.len(),
                start.elapsed().as_secs_f64(),
                provider.cached_layers()
            );
            if !aggregator.incomplete.is_empty() {
                log::warn!(
                    "{} clusters had zero or non-finite energy on one side and were not compared",
                    aggregator.incomplete.len()
                );
            }
            if !aggregator.failures.is_empty() {
                log::warn!("{} events failed", aggregator.failures.len());
            }

            print!("{}", report::render_histograms(&aggregator, &report_config));
            println!();
            print!(
                "{}",
                report::render_outliers(
                    &aggregator.outliers(report_config.outlier_threshold),
                    report_config.outlier_threshold
                )
            );
        }

        Commands::Info { events } => {
            let table = EventTable::open(&events)?;
            let unassigned: usize = table.events().iter().map(EventHits::unassigned_count).sum();
            let energy: f64 = table.events().iter().map(EventHits::assigned_energy).sum();

            println!("File: {}", events.display());
            println!("Events: {}", table.len());
            println!("Rejected events: {}", table.rejected().len());
            println!("Hits: {}", table.total_hits());
            println!("Unassigned hits: {}", unassigned);
            println!("Assigned energy: {:.4}", energy);
            if let (Some(first), Some(last)) = (table.ids().min(), table.ids().max()) {
                println!("Event id range: {} - {}", first, last);
            }
        }

        Commands::Layer {
            events,
            event,
            layers,
            mesh,
        } => {
            let layout = mesh.layout();
            let square_mesh = load_square_mesh(&layout)?;
            let provider = FileTableProvider::new(layout);
            let engine = InterpolationEngine::new(&square_mesh, &provider, mesh.config())?;

            let table = EventTable::open(&events)?;
            let hits = table.get(event).ok_or(CliError::UnknownEvent(event))?;

            let layers = if layers.is_empty() {
                (1..=engine.config().total_layers).collect()
            } else {
                layers
            };
            let mut reports = Vec::with_capacity(layers.len());
            for layer in layers {
                if let Some(r) = engine.layer_report(hits, layer)? {
                    reports.push(r);
                }
            }
            print!("{}", report::render_layer_reports(event, &reports));
        }
    }

    Ok(())
}
