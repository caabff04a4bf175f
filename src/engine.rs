// Monte Carlo comparison engine
//
// The pipeline is fixed: count full-set points per area, run N independent
// resampling iterations, convert counts to percentages, trim each area's
// distribution to its confidence band, then derive local and global S.

use crate::area::Area;
use crate::error::{Result, SpptError};
use crate::resample;
use crate::stats;
use crate::RunConfig;
use geo::{Contains, Point, Polygon};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Count the points that fall within the polygon.
///
/// The geometric predicate is the `geo` crate's `Contains`; its boundary
/// convention (boundary points are not contained) passes through unaltered.
/// No side effects, O(|points|), independent of area ordering.
pub fn count_within(polygon: &Polygon<f64>, points: &[Point<f64>]) -> usize {
    points.iter().filter(|point| polygon.contains(*point)).count()
}

/// 100 * count / total, substituting 0.0 when the divisor is zero.
fn percentage(count: usize, total: usize) -> f64 {
    if total > 0 {
        100.0 * count as f64 / total as f64
    } else {
        0.0
    }
}

// ============================================================================
// RUN RESULTS
// ============================================================================

// Summary metadata for a completed run
// This gets serialized into the output alongside the per-area features
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub global_s: f64,
    pub seed: u64,
    pub iterations: usize,
    pub sample_percentage: u32,
    pub confidence_interval: u32,
    pub trim_count: usize,
    pub total_base_points: usize,
    pub total_test_points: usize,
    pub sampled_per_iteration: usize,
    pub num_areas: usize,
}

/// The outcome of a run: summary metadata plus the fully populated areas.
/// Never mutated after the run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub summary: RunSummary,
    pub areas: Vec<Area>,
}

impl RunResult {
    pub fn global_s(&self) -> f64 {
        self.summary.global_s
    }

    pub fn seed(&self) -> u64 {
        self.summary.seed
    }
}

// ============================================================================
// THE PIPELINE
// ============================================================================

/// Run the full test.
///
/// `on_iteration` is invoked with the number of completed iterations after
/// each one finishes; iterations run in parallel, each with its own RNG
/// derived from the master seed, so a fixed seed reproduces the run exactly
/// regardless of scheduling.
pub fn run<F>(
    config: &RunConfig,
    base_points: &[Point<f64>],
    test_points: &[Point<f64>],
    mut areas: Vec<Area>,
    on_iteration: F,
) -> Result<RunResult>
where
    F: Fn(u64) + Sync,
{
    config.validate()?;
    if areas.is_empty() {
        return Err(SpptError::config(
            "no areas supplied; aggregation needs at least one area",
        ));
    }

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let trim_count = config.trim_count();
    let total_base_points = base_points.len();
    let abs_total_test_points = test_points.len();
    info!(
        "comparing {} base points against {} test points over {} areas (seed {})",
        total_base_points,
        abs_total_test_points,
        areas.len(),
        seed
    );

    // Full-set counts per area. The test point count is for reporting only;
    // the test itself works on the Monte Carlo samples.
    info!("counting base and test points in each area");
    for area in areas.iter_mut() {
        area.num_base_points = count_within(&area.polygon, base_points);
        area.abs_num_test_points = count_within(&area.polygon, test_points);
    }

    // Monte Carlo iterations. Every iteration samples the same absolute
    // number of points: the resampler removes a fixed count, whatever the
    // composition of the draw.
    let sampled_per_iteration =
        resample::sample_size(abs_total_test_points, config.sample_percentage);
    info!(
        "running {} Monte Carlo iterations, sampling {}% of the test points ({} per iteration)",
        config.iterations, config.sample_percentage, sampled_per_iteration
    );
    let completed = AtomicU64::new(0);
    let per_iteration_counts: Vec<Vec<usize>> = (0..config.iterations)
        .into_par_iter()
        .map(|iteration| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(iteration as u64));
            let sampled = resample::sample(test_points, config.sample_percentage, &mut rng);
            debug_assert_eq!(sampled.len(), sampled_per_iteration);
            let counts: Vec<usize> = areas
                .iter()
                .map(|area| count_within(&area.polygon, &sampled))
                .collect();
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("completed run {done}");
            on_iteration(done);
            counts
        })
        .collect();

    // All iterations place the same number of points, so the in-area total
    // from iteration 0 serves for every iteration.
    let total_sampled_test_points: usize = per_iteration_counts[0].iter().sum();
    if total_base_points == 0 {
        warn!("base point set is empty; base percentages substituted with 0.0");
    }
    if abs_total_test_points == 0 {
        warn!("test point set is empty; test percentages substituted with 0.0");
    } else if total_sampled_test_points == 0 {
        warn!("no sampled test points fell inside any area; test percentages substituted with 0.0");
    }

    // Percentages per area, for each iteration and for the full sets.
    info!("calculating percentage test points in each area for each run");
    for (area_index, area) in areas.iter_mut().enumerate() {
        area.test_percentages = per_iteration_counts
            .iter()
            .map(|counts| percentage(counts[area_index], total_sampled_test_points))
            .collect();
        area.percentage_base_points = percentage(area.num_base_points, total_base_points);
        area.abs_percentage_test_points =
            percentage(area.abs_num_test_points, abs_total_test_points);
    }

    // Rank each area's percentages and remove the configured outliers.
    info!(
        "ranking percentages in ascending order and removing {} outliers from top and bottom",
        trim_count
    );
    for area in areas.iter_mut() {
        area.trimmed_percentages = stats::trim_outliers(&area.test_percentages, trim_count)?;
    }

    // Local S per area, then the global score.
    info!("calculating S-index for each area");
    for area in areas.iter_mut() {
        let (lo, hi) = area
            .band()
            .ok_or_else(|| SpptError::invariant("confidence band missing after trimming"))?;
        area.local_s = stats::local_s(area.percentage_base_points, lo, hi)?;
    }
    let local_s_values: Vec<i8> = areas.iter().map(|area| area.local_s).collect();
    let global_s = stats::global_s(&local_s_values)?;
    info!("found global S value: {global_s}");

    Ok(RunResult {
        summary: RunSummary {
            global_s,
            seed,
            iterations: config.iterations,
            sample_percentage: config.sample_percentage,
            confidence_interval: config.confidence_interval,
            trim_count,
            total_base_points,
            total_test_points: abs_total_test_points,
            sampled_per_iteration,
            num_areas: local_s_values.len(),
        },
        areas,
    })
}
