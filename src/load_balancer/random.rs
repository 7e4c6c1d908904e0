//! Uniform random selection.

use rand::Rng;

/// Pick a uniformly random index in `0..len`. `len` must be non-zero.
pub fn random_index(len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_distribution() {
        let len = 4;
        let samples = 40_000;
        let mut counts = vec![0usize; len];

        for _ in 0..samples {
            counts[random_index(len)] += 1;
        }

        // expected 10_000 each; allow a wide statistical margin
        for count in counts {
            assert!((8_500..=11_500).contains(&count), "skewed count: {}", count);
        }
    }

    #[test]
    fn test_single_candidate() {
        for _ in 0..10 {
            assert_eq!(random_index(1), 0);
        }
    }
}
