// Statistical core of the test: outlier trimming and S-index calculation

use crate::error::{Result, SpptError};

// ============================================================================
// OUTLIER TRIMMING
// ============================================================================

/// Sort a percentage distribution ascending and remove `trim_count` extreme
/// values from each tail, producing the empirical confidence band.
///
/// Ties sort in arbitrary order; stability is not required because only the
/// multiset of surviving values matters. Fails when the trim would leave an
/// empty band (a configuration problem, caught again here as a guard).
pub fn trim_outliers(percentages: &[f64], trim_count: usize) -> Result<Vec<f64>> {
    if 2 * trim_count >= percentages.len() {
        return Err(SpptError::config(format!(
            "removing {} outliers from each tail of {} samples leaves an empty band",
            trim_count,
            percentages.len()
        )));
    }
    let mut sorted = percentages.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.truncate(sorted.len() - trim_count);
    sorted.drain(..trim_count);
    Ok(sorted)
}

// ============================================================================
// S-INDEX
// ============================================================================

/// Local significance of one area: compare the actual base-point percentage
/// against the trimmed band `[lo, hi]`.
///
/// - inside the band (inclusive) -> 0, no significant difference
/// - below the band -> -1, base under-represented
/// - above the band -> +1, base over-represented
///
/// The three cases are exhaustive for well-ordered reals. Falling through
/// all of them means a NaN crept into the band or the base percentage; that
/// is a bug upstream, reported as an invariant violation rather than
/// silently mapped to one of the legitimate outcomes.
pub fn local_s(percentage_base_points: f64, lo: f64, hi: f64) -> Result<i8> {
    if percentage_base_points >= lo && percentage_base_points <= hi {
        Ok(0)
    } else if percentage_base_points < lo {
        Ok(-1)
    } else if percentage_base_points > hi {
        Ok(1)
    } else {
        Err(SpptError::invariant(format!(
            "local S fell through all cases: percentage base points = {}, band = [{}, {}]",
            percentage_base_points, lo, hi
        )))
    }
}

/// Global agreement score over all areas: 1 - sum(|local S|) / num areas.
///
/// 1.0 means no area disagrees, 0.0 means every area does. Zero areas is a
/// configuration error (the caller should have rejected the run earlier).
pub fn global_s(local_s_values: &[i8]) -> Result<f64> {
    if local_s_values.is_empty() {
        return Err(SpptError::config(
            "cannot compute a global S value over zero areas",
        ));
    }
    let disagreement: u32 = local_s_values.iter().map(|s| u32::from(s.unsigned_abs())).sum();
    Ok(1.0 - disagreement as f64 / local_s_values.len() as f64)
}
