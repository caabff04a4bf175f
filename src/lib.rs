// Spatial Point Pattern Test Core
//
// This library implements Andresen's S-index test: a Monte Carlo comparison
// of two spatial point datasets ("base" and "test") aggregated over a common
// set of areal units. The test resamples the test points many times, counts
// points-in-polygon per area per iteration, trims the resulting empirical
// percentage distribution to a confidence band, and reports per-area local S
// values (-1/0/+1) plus a single global agreement score in [0, 1].

pub mod area;
pub mod engine;
pub mod error;
pub mod grid;
pub mod io;
pub mod resample;
pub mod stats;

pub use area::Area;
pub use engine::{run, RunResult, RunSummary};
pub use error::{Result, SpptError};

// ============================================================================
// RUN CONFIGURATION
// ============================================================================

// Immutable parameters for a single run of the test
//
// The confidence interval controls how many extreme Monte Carlo outcomes are
// trimmed from each tail of every area's percentage distribution:
// trim_count = round(iterations * (100 - confidence) / 100 / 2)
#[derive(Debug, Clone)]
pub struct RunConfig {
    // Number of Monte Carlo iterations (>= 1)
    pub iterations: usize,

    // Percentage of test points drawn each iteration (1-100)
    // 100 is legal: the sample is then a full-size random permutation
    pub sample_percentage: u32,

    // Confidence interval percentage (1-100)
    pub confidence_interval: u32,

    // Seed for the random source; a fresh seed is drawn when None.
    // Fixing the seed makes a run exactly reproducible.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    // Defaults follow the established practice for this test:
    // 100 iterations, 85% samples, 95% confidence interval.
    fn default() -> Self {
        Self {
            iterations: 100,
            sample_percentage: 85,
            confidence_interval: 95,
            seed: None,
        }
    }
}

impl RunConfig {
    /// Number of extreme values removed from each tail of an area's
    /// sorted percentage distribution.
    pub fn trim_count(&self) -> usize {
        let remove_fraction = (100 - self.confidence_interval) as f64 / 100.0;
        (self.iterations as f64 * remove_fraction / 2.0).round() as usize
    }

    /// Validate the configuration before any computation starts.
    ///
    /// Rejects an iteration count below 1, percentages outside 1-100, and a
    /// confidence interval whose trim count would leave an empty band.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < 1 {
            return Err(SpptError::config(format!(
                "iteration count must be at least 1, got {}",
                self.iterations
            )));
        }
        if !(1..=100).contains(&self.sample_percentage) {
            return Err(SpptError::config(format!(
                "sample percentage must be in 1-100, got {}",
                self.sample_percentage
            )));
        }
        if !(1..=100).contains(&self.confidence_interval) {
            return Err(SpptError::config(format!(
                "confidence interval must be in 1-100, got {}",
                self.confidence_interval
            )));
        }
        let trim_count = self.trim_count();
        if 2 * trim_count >= self.iterations {
            return Err(SpptError::config(format!(
                "confidence interval {}% over {} iterations trims {} values from \
                 each tail, leaving an empty band; raise the iteration count or \
                 the confidence interval",
                self.confidence_interval, self.iterations, trim_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_count_formula() {
        // round(100 * 5 / 100 / 2) = round(2.5) = 3
        let config = RunConfig {
            iterations: 100,
            confidence_interval: 95,
            ..Default::default()
        };
        assert_eq!(config.trim_count(), 3);

        // round(20 * 10 / 100 / 2) = round(1.0) = 1
        let config = RunConfig {
            iterations: 20,
            confidence_interval: 90,
            ..Default::default()
        };
        assert_eq!(config.trim_count(), 1);

        // 100% confidence trims nothing
        let config = RunConfig {
            iterations: 10,
            confidence_interval: 100,
            ..Default::default()
        };
        assert_eq!(config.trim_count(), 0);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_iterations() {
        let config = RunConfig {
            iterations: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_percentages() {
        let config = RunConfig {
            sample_percentage: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            sample_percentage: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            confidence_interval: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_confidence_band() {
        // round(10 * 95 / 100 / 2) = 5 removed per tail, 2*5 >= 10
        let config = RunConfig {
            iterations: 10,
            confidence_interval: 5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        // One more iteration and the band is non-empty again
        let config = RunConfig {
            iterations: 11,
            confidence_interval: 5,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
