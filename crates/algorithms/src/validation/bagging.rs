//! Bootstrap resampling of training sets

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Generator for the bags of one fold.
///
/// Each fold reads its own stream of the seeded generator, so folds can
/// be evaluated in any order, or concurrently, with identical draws.
pub fn fold_rng(seed: u64, fold: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(fold as u64);
    rng
}

/// Draw `size` elements uniformly, with replacement.
pub fn sample_with_replacement<T: Copy, R: Rng + ?Sized>(
    population: &[T],
    size: usize,
    rng: &mut R,
) -> Vec<T> {
    if population.is_empty() {
        return Vec::new();
    }
    (0..size)
        .map(|_| population[rng.gen_range(0..population.len())])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_and_membership() {
        let pop: Vec<u32> = (0..50).collect();
        let mut rng = fold_rng(1, 0);
        let s = sample_with_replacement(&pop, 37, &mut rng);
        assert_eq!(s.len(), 37);
        assert!(s.iter().all(|v| pop.contains(v)));
    }

    #[test]
    fn test_reproducible() {
        let pop: Vec<u32> = (0..1000).collect();
        let a = sample_with_replacement(&pop, 100, &mut fold_rng(42, 3));
        let b = sample_with_replacement(&pop, 100, &mut fold_rng(42, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_folds_draw_different_streams() {
        let pop: Vec<u32> = (0..1000).collect();
        let a = sample_with_replacement(&pop, 100, &mut fold_rng(42, 0));
        let b = sample_with_replacement(&pop, 100, &mut fold_rng(42, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn test_draws_repeat() {
        // 200 draws from 10 values must repeat
        let pop: Vec<u32> = (0..10).collect();
        let s = sample_with_replacement(&pop, 200, &mut fold_rng(7, 0));
        let mut uniq = s.clone();
        uniq.sort_unstable();
        uniq.dedup();
        assert!(uniq.len() < s.len());
    }

    #[test]
    fn test_empty_population() {
        let pop: Vec<u32> = Vec::new();
        assert!(sample_with_replacement(&pop, 5, &mut fold_rng(0, 0)).is_empty());
    }
}
