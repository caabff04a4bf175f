// Areal reporting units and their per-run statistics

use geo::Polygon;
use serde_json::{Map, Value};

/// A single areal unit: a polygon boundary, the attribute record it was
/// loaded with (passed through unchanged to the output), and the statistics
/// accumulated for it over one run.
///
/// The statistics fields are populated exactly once, in a fixed order:
/// counts, then the per-iteration percentage sequence, then the trimmed
/// band, then the local S value. An `Area` is read-only after the run.
#[derive(Debug, Clone)]
pub struct Area {
    /// The polygon boundary of the area
    pub polygon: Polygon<f64>,

    /// Attribute record from the source feature (empty for grid cells)
    pub attributes: Map<String, Value>,

    /// Synthesized id for grid-generated cells, None for loaded areas
    pub id: Option<u64>,

    /// Number of base points within the polygon
    pub num_base_points: usize,

    /// Number of test points within the polygon (reporting only; the test
    /// itself works on the Monte Carlo samples, not the full test set)
    pub abs_num_test_points: usize,

    /// 100 * num_base_points / total base points (0.0 when there are none)
    pub percentage_base_points: f64,

    /// 100 * abs_num_test_points / total test points (reporting only)
    pub abs_percentage_test_points: f64,

    /// Percentage of each iteration's sampled test subset that fell in this
    /// area; slot i belongs to iteration i
    pub test_percentages: Vec<f64>,

    /// `test_percentages` sorted ascending with the configured number of
    /// extreme values removed from each end
    pub trimmed_percentages: Vec<f64>,

    /// Local significance: -1 (base under-represented), 0 (no significant
    /// difference), +1 (base over-represented)
    pub local_s: i8,
}

impl Area {
    /// Create an area from a bare polygon with no attributes.
    pub fn new(polygon: Polygon<f64>) -> Self {
        Self::with_attributes(polygon, Map::new())
    }

    /// Create an area from a polygon plus the attribute record of the
    /// feature it was loaded from.
    pub fn with_attributes(polygon: Polygon<f64>, attributes: Map<String, Value>) -> Self {
        Self {
            polygon,
            attributes,
            id: None,
            num_base_points: 0,
            abs_num_test_points: 0,
            percentage_base_points: 0.0,
            abs_percentage_test_points: 0.0,
            test_percentages: Vec::new(),
            trimmed_percentages: Vec::new(),
            local_s: 0,
        }
    }

    /// The empirical confidence band `[lo, hi]`, available once the
    /// trimmed percentages have been computed.
    pub fn band(&self) -> Option<(f64, f64)> {
        match (
            self.trimmed_percentages.first(),
            self.trimmed_percentages.last(),
        ) {
            (Some(&lo), Some(&hi)) => Some((lo, hi)),
            _ => None,
        }
    }
}
