//! Reproducible sampling without replacement.

use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DEFAULT_SEED: u64 = 42;

/// Draw `size` items without replacement, keeping their input order.
/// Returns everything when `size` covers the whole input.
pub fn sample<T: Clone>(items: &[T], size: usize, seed: u64) -> Vec<T> {
    if size >= items.len() {
        return items.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, items.len(), size).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| items[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sample() {
        let items: Vec<u32> = (0..1000).collect();
        let a = sample(&items, 50, DEFAULT_SEED);
        let b = sample(&items, 50, DEFAULT_SEED);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn small_input_is_returned_whole() {
        let items = vec![3.0, 1.0, 2.0];
        assert_eq!(sample(&items, 5, DEFAULT_SEED), items);
        assert_eq!(sample(&items, 3, 7), items);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let items: Vec<u32> = (0..10_000).collect();
        assert_ne!(sample(&items, 20, 1), sample(&items, 20, 2));
    }
}
