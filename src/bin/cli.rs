// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycell Kernel CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use nalgebra::Point3;
use polycell::geometry::{boolean_two_sets, BooleanOperation, Polygon, Polyline, VoidTreatment};
use polycell::{CellComplex, KernelConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "polycell")]
#[command(about = "Polycell Kernel - polygon booleans and cell complexes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the configured cell complex tolerance
    #[arg(long, global = true)]
    tolerance: Option<f64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a grid of box cells and write the complex as JSON
    Grid {
        /// Cell size along X
        #[arg(long, default_value = "1.0")]
        width: f64,

        /// Cell size along Y
        #[arg(long, default_value = "1.0")]
        depth: f64,

        /// Cell height
        #[arg(long, default_value = "1.0")]
        height: f64,

        /// Cells along X
        #[arg(long, default_value = "2")]
        columns: usize,

        /// Cells along Y
        #[arg(long, default_value = "2")]
        rows: usize,

        /// Stacked levels
        #[arg(long, default_value = "1")]
        levels: usize,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print entity counts of a JSON complex
    Stats {
        /// Input JSON file
        input: PathBuf,
    },

    /// Run a polygon boolean described by a JSON file
    Boolean {
        /// Input JSON with `subjects`, `clips`, `operation` and optional `voids`
        input: PathBuf,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split every cell of a JSON complex with a polyline in plan
    Split {
        /// Input JSON file
        input: PathBuf,

        /// Polyline vertices as `x,y;x,y;...`
        #[arg(short, long)]
        polyline: String,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Deserialize)]
struct BooleanInput {
    subjects: Vec<Polygon>,
    #[serde(default)]
    clips: Vec<Polygon>,
    operation: BooleanOperation,
    #[serde(default)]
    voids: VoidTreatment,
}

#[derive(Serialize)]
struct BooleanOutput {
    polygons: Vec<Polygon>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = KernelConfig::load()?;
    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
        config.check()?;
    }
    config.apply();

    match cli.command {
        Commands::Grid {
            width,
            depth,
            height,
            columns,
            rows,
            levels,
            output,
        } => grid_command(
            &config,
            [width, depth, height],
            [columns, rows, levels],
            output.as_deref(),
            cli.verbose,
        )?,
        Commands::Stats { input } => stats_command(&input)?,
        Commands::Boolean { input, output } => {
            boolean_command(&config, &input, output.as_deref(), cli.verbose)?
        }
        Commands::Split {
            input,
            polyline,
            output,
        } => split_command(&input, &polyline, output.as_deref(), cli.verbose)?,
        Commands::Version => {
            println!("Polycell Kernel v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn read_complex(input: &Path) -> Result<CellComplex> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to load cell complex from {}", input.display()))
}

fn grid_command(
    config: &KernelConfig,
    [width, depth, height]: [f64; 3],
    [columns, rows, levels]: [usize; 3],
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let start = std::time::Instant::now();
    let mut complex = CellComplex::with_tolerance(config.tolerance);
    for level in 0..levels {
        for row in 0..rows {
            for column in 0..columns {
                let origin = Point3::new(column as f64 * width, row as f64 * depth, 0.0);
                let footprint = Polygon::rectangle(origin, width, depth)?;
                complex.add_cell_from_polygon(&footprint, height, level as f64 * height, None, None)?;
            }
        }
    }

    if verbose {
        eprintln!(
            "{} {} cells in {:.2?}",
            "Built".green(),
            complex.cell_count().to_string().cyan(),
            start.elapsed()
        );
    }
    write_json(&complex, output)
}

fn stats_command(input: &Path) -> Result<()> {
    let complex = read_complex(input)?;

    let mut by_face_count = [0usize; 4];
    for edge in complex.edges() {
        by_face_count[edge.faces.len().min(3)] += 1;
    }

    println!("\n{}", "━".repeat(60).bright_black());
    println!("{} {}", "Complex:".bold(), input.display().to_string().cyan());
    println!("{}", "━".repeat(60).bright_black());
    println!("  {} {}", "Vertices:".bright_black(), complex.vertex_count());
    println!("  {} {}", "Orientations:".bright_black(), complex.orientation_count());
    println!("  {} {}", "Edges:".bright_black(), complex.edge_count());
    println!("  {} {}", "Faces:".bright_black(), complex.face_count());
    println!("  {} {}", "Cells:".bright_black(), complex.cell_count());

    println!("\n{}", "Edges by incident faces:".bold());
    println!("  {} {}", "0:".bright_black(), by_face_count[0]);
    println!("  {} {}", "1:".bright_black(), by_face_count[1].to_string().red());
    println!("  {} {}", "2:".bright_black(), by_face_count[2].to_string().blue());
    println!("  {} {}", ">2:".bright_black(), by_face_count[3].to_string().green());
    Ok(())
}

fn boolean_command(
    config: &KernelConfig,
    input: &Path,
    output: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let request: BooleanInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse boolean input {}", input.display()))?;

    let polygons = boolean_two_sets(
        &request.subjects,
        &request.clips,
        request.operation,
        request.voids,
        config.clipper_tolerance,
    )
    .unwrap_or_default();

    if verbose {
        let area: f64 = polygons
            .iter()
            .map(|p| if p.is_clockwise() { -p.area() } else { p.area() })
            .sum();
        eprintln!(
            "{} {:?}: {} polygon(s), net area {:.6}",
            "✅".green(),
            request.operation,
            polygons.len().to_string().cyan(),
            area
        );
    }
    write_json(&BooleanOutput { polygons }, output)
}

/// Parse `x,y;x,y;...` into points at z = 0
fn parse_polyline(text: &str) -> Result<Polyline> {
    let mut points = Vec::new();
    for pair in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((x, y)) = pair.split_once(',') else {
            bail!("Expected `x,y`, got `{}`", pair);
        };
        let x: f64 = x.trim().parse().with_context(|| format!("Invalid x in `{}`", pair))?;
        let y: f64 = y.trim().parse().with_context(|| format!("Invalid y in `{}`", pair))?;
        points.push(Point3::new(x, y, 0.0));
    }
    Ok(Polyline::new(points)?)
}

fn split_command(input: &Path, polyline: &str, output: Option<&Path>, verbose: bool) -> Result<()> {
    let mut complex = read_complex(input)?;
    let polyline = parse_polyline(polyline)?;

    let cell_ids: Vec<u64> = complex.cells().map(|c| c.id).collect();
    let mut split = 0;
    for cell_id in cell_ids {
        match complex.try_split_cell(cell_id, &polyline) {
            Some(new_cells) => {
                split += 1;
                if verbose {
                    eprintln!(
                        "{} cell {} -> {:?}",
                        "✂".yellow(),
                        cell_id,
                        new_cells
                    );
                }
            }
            None if verbose => {
                eprintln!("{} cell {}", "Skipped".bright_black(), cell_id);
            }
            None => {}
        }
    }

    eprintln!(
        "{} {} cell(s), {} cells total",
        "Split".green().bold(),
        split.to_string().cyan(),
        complex.cell_count()
    );
    write_json(&complex, output)
}
