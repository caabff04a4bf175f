// Spatial Point Pattern Test CLI
//
// Loads the base and test point sets plus an area file (or synthesizes a
// regular grid over the data), runs the Monte Carlo comparison, and writes
// the per-area results as GeoJSON.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use sppt::{engine, grid, io, RunConfig};
use std::path::PathBuf;

/// CLI arguments for the comparison run
#[derive(Parser, Debug)]
#[command(name = "compare")]
#[command(about = "Monte Carlo comparison of two point patterns over areal units", long_about = None)]
struct Args {
    /// GeoJSON file with the base (reference) points
    #[arg(short, long)]
    base: PathBuf,

    /// GeoJSON file with the test points
    #[arg(short, long)]
    test: PathBuf,

    /// GeoJSON file with the areas to aggregate into
    #[arg(short, long)]
    areas: Option<PathBuf>,

    /// Generate a regular n-by-n grid over the data instead of loading areas
    #[arg(short, long, value_name = "N")]
    grid_size: Option<usize>,

    /// Output GeoJSON file for the per-area results
    #[arg(short, long)]
    output: PathBuf,

    /// Number of Monte Carlo iterations
    #[arg(short = 'n', long, default_value_t = 100)]
    iterations: usize,

    /// Percentage of test points sampled each iteration (1-100)
    #[arg(short = 'p', long, default_value_t = 85)]
    sample_percentage: u32,

    /// Confidence interval percentage (1-100)
    #[arg(short = 'c', long, default_value_t = 95)]
    confidence_interval: u32,

    /// RNG seed for reproducible runs (a fresh seed is drawn when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

/// Which area source the arguments selected
enum AreaSource {
    File(PathBuf),
    Grid(usize),
}

/// Boundary validation: files must exist, exactly one area source, grid
/// size at least 1. Range checks on the run parameters live in RunConfig.
fn validate_args(args: &Args) -> Result<AreaSource, String> {
    for (label, path) in [("base", &args.base), ("test", &args.test)] {
        if !path.exists() {
            return Err(format!("{} file not found: {}", label, path.display()));
        }
    }
    match (&args.areas, args.grid_size) {
        (Some(path), None) => {
            if !path.exists() {
                return Err(format!("areas file not found: {}", path.display()));
            }
            Ok(AreaSource::File(path.clone()))
        }
        (None, Some(size)) => {
            if size < 1 {
                return Err(format!("grid size must be at least 1, got {}", size));
            }
            Ok(AreaSource::Grid(size))
        }
        (Some(_), Some(_)) => Err("--areas and --grid-size are mutually exclusive".to_string()),
        (None, None) => Err("one of --areas or --grid-size is required".to_string()),
    }
}

fn area_source_description(source: &AreaSource) -> String {
    match source {
        AreaSource::File(path) => path.display().to_string(),
        AreaSource::Grid(size) => format!("regular {size}x{size} grid"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;
    let args = Args::parse();
    let area_source = validate_args(&args)?;

    let config = RunConfig {
        iterations: args.iterations,
        sample_percentage: args.sample_percentage,
        confidence_interval: args.confidence_interval,
        seed: args.seed,
    };
    config.validate()?;

    // Print configuration
    println!("\nSpatial Point Pattern Test");
    println!("=======================================");
    println!("  Base data: {}", args.base.display());
    println!("  Test data: {}", args.test.display());
    println!("  Area data: {}", area_source_description(&area_source));
    println!("  Monte Carlo runs: {}", args.iterations);
    println!("  Sample percentage: {}", args.sample_percentage);
    println!("  Confidence interval: {}", args.confidence_interval);
    println!(
        "  Build: {} ({})",
        env!("BUILD_GIT_SHA"),
        env!("BUILD_RUSTC_VERSION")
    );
    println!("=======================================\n");

    // Load everything at the boundary; the engine itself never touches files
    let base_points = io::load_points(&args.base)?;
    let test_points = io::load_points(&args.test)?;
    let areas = match &area_source {
        AreaSource::File(path) => io::load_areas(path)?,
        AreaSource::Grid(size) => {
            let mut combined = base_points.clone();
            combined.extend_from_slice(&test_points);
            grid::regular_grid(*size, &combined)
        }
    };
    println!(
        "Read {} base points, {} test points, {} areas.",
        base_points.len(),
        test_points.len(),
        areas.len()
    );

    // Create progress bar over the Monte Carlo iterations
    let pb = ProgressBar::new(args.iterations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} iterations ({percent}%)")?
            .progress_chars("█▓▒░ "),
    );

    let result = engine::run(&config, &base_points, &test_points, areas, |done| {
        pb.set_position(done)
    })?;
    pb.finish_with_message("✓ Monte Carlo simulation complete");

    io::write_results(&args.output, &result)?;

    println!("\nGlobal S: {:.4}", result.global_s());
    println!("Seed: {}", result.seed());
    println!("Output: {}\n", args.output.display());

    Ok(())
}
