//! Round-robin cursor.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Rotating position within a candidate list.
///
/// The stored value is always reduced modulo the candidate count seen by the
/// last selection, so it stays a valid index while membership is unchanged.
#[derive(Debug, Default)]
pub struct Cursor {
    position: AtomicUsize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index to use for a list of `len` candidates and advance.
    ///
    /// Read, modulo and store happen in a single compare-and-swap, so two
    /// concurrent callers never observe the same pre-increment value.
    /// `len` must be non-zero.
    pub fn next_index(&self, len: usize) -> usize {
        debug_assert!(len > 0, "round robin over an empty candidate list");
        let (Ok(previous) | Err(previous)) =
            self.position
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    Some((current % len + 1) % len)
                });
        previous % len
    }

    /// Current stored position.
    pub fn position(&self) -> usize {
        self.position.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_round_robin() {
        let cursor = Cursor::new();

        assert_eq!(cursor.next_index(3), 0);
        assert_eq!(cursor.next_index(3), 1);
        assert_eq!(cursor.next_index(3), 2);
        assert_eq!(cursor.next_index(3), 0);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn test_membership_shrink_stays_in_range() {
        let cursor = Cursor::new();
        cursor.next_index(5);
        cursor.next_index(5);
        cursor.next_index(5);
        // position is 3, fewer candidates now
        assert_eq!(cursor.next_index(2), 1);
        assert_eq!(cursor.next_index(2), 0);
    }

    #[test]
    fn test_concurrent_selections_cover_evenly() {
        let cursor = Arc::new(Cursor::new());
        let len = 4;
        let per_thread = 1_000;
        let threads = 8;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let cursor = cursor.clone();
                std::thread::spawn(move || {
                    (0..per_thread).map(|_| cursor.next_index(len)).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: HashMap<usize, usize> = HashMap::new();
        for handle in handles {
            for index in handle.join().unwrap() {
                *counts.entry(index).or_default() += 1;
            }
        }

        // 8000 selections over 4 slots: exactly 2000 each if no index was duplicated or skipped
        for index in 0..len {
            assert_eq!(counts[&index], threads * per_thread / len);
        }
    }
}
