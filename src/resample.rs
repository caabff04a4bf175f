// Percentage resampling of the test point set
//
// One draw per Monte Carlo iteration: shuffle a copy of the points, then
// drop the first `removal_count` entries. Dropping a fixed count (rather
// than a recomputed fraction of whatever survived) is what guarantees that
// every iteration samples exactly the same number of points.

use geo::Point;
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of points removed for a sample at the given percentage.
pub fn removal_count(total: usize, percentage: u32) -> usize {
    (total as f64 * ((100.0 - percentage as f64) / 100.0)).round() as usize
}

/// Size of every sample drawn at the given percentage.
pub fn sample_size(total: usize, percentage: u32) -> usize {
    total - removal_count(total, percentage)
}

/// Draw a `percentage`% subset of `points`, uniformly without replacement,
/// in no guaranteed order. Each call returns an independent copy.
///
/// `percentage = 100` removes round(n * 0 / 100) = 0 points and therefore
/// returns a full-size random permutation; size is preserved, order is not.
pub fn sample<R: Rng + ?Sized>(
    points: &[Point<f64>],
    percentage: u32,
    rng: &mut R,
) -> Vec<Point<f64>> {
    let mut copy = points.to_vec();
    copy.shuffle(rng);
    copy.split_off(removal_count(points.len(), percentage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn points(n: usize) -> Vec<Point<f64>> {
        (0..n).map(|i| Point::new(i as f64, i as f64 * 2.0)).collect()
    }

    #[test]
    fn sample_size_law() {
        // |sample| = n - round(n * (100 - p) / 100)
        assert_eq!(sample_size(100, 85), 85);
        assert_eq!(sample_size(20, 85), 17); // round(3.0) = 3 removed
        assert_eq!(sample_size(10, 75), 7); // round(2.5) = 3 removed
        assert_eq!(sample_size(7, 50), 3); // round(3.5) = 4 removed
        assert_eq!(sample_size(0, 50), 0);

        let mut rng = StdRng::seed_from_u64(7);
        for &(n, p) in &[(100usize, 85u32), (20, 85), (10, 75), (7, 50), (1, 1)] {
            let drawn = sample(&points(n), p, &mut rng);
            assert_eq!(drawn.len(), sample_size(n, p));
        }
    }

    #[test]
    fn sample_is_a_subset_without_duplicates() {
        let input = points(50);
        let mut rng = StdRng::seed_from_u64(11);
        let drawn = sample(&input, 60, &mut rng);

        // Every sampled point exists in the input, and no input point is
        // drawn twice (coordinates are unique by construction).
        let mut seen = std::collections::HashSet::new();
        for p in &drawn {
            assert!(input.contains(p));
            assert!(seen.insert((p.x().to_bits(), p.y().to_bits())));
        }
    }

    #[test]
    fn full_percentage_returns_a_permutation() {
        let input = points(30);
        let mut rng = StdRng::seed_from_u64(3);
        let drawn = sample(&input, 100, &mut rng);

        assert_eq!(drawn.len(), input.len());
        let mut sorted = drawn.clone();
        sorted.sort_by(|a, b| a.x().total_cmp(&b.x()));
        assert_eq!(sorted, input);
    }

    #[test]
    fn consecutive_draws_are_independent() {
        let input = points(100);
        let mut rng = StdRng::seed_from_u64(42);
        let first = sample(&input, 50, &mut rng);
        let second = sample(&input, 50, &mut rng);
        assert_eq!(first.len(), second.len());
        assert_ne!(first, second);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let input = points(40);
        let a = sample(&input, 70, &mut StdRng::seed_from_u64(9));
        let b = sample(&input, 70, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
