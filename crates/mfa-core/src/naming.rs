//! Collision-free output name tokens.
//!
//! One allocator is built per run and shared (via `Arc`) by every worker, so
//! concurrent fetches writing into the same directory never reuse a token.

use std::sync::atomic::{AtomicI64, Ordering};

/// Token embedded in an output filename. Dispensed once per executed job.
pub type NameToken = i64;

/// Shared monotonically increasing counter.
#[derive(Debug, Default)]
pub struct NamingAllocator {
    last: AtomicI64,
}

impl NamingAllocator {
    /// First call to `next` returns 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// First call to `next` returns `last + 1`.
    pub fn starting_after(last: NameToken) -> Self {
        Self {
            last: AtomicI64::new(last),
        }
    }

    /// Returns a token strictly greater than every token returned before.
    pub fn next(&self) -> NameToken {
        self.last.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Most recently dispensed token (0 when none has been handed out).
    pub fn last(&self) -> NameToken {
        self.last.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn tokens_start_at_one_and_increase() {
        let alloc = NamingAllocator::new();
        assert_eq!(alloc.last(), 0);
        assert_eq!(alloc.next(), 1);
        assert_eq!(alloc.next(), 2);
        assert_eq!(alloc.last(), 2);
    }

    #[test]
    fn starting_after_resumes_sequence() {
        let alloc = NamingAllocator::starting_after(41);
        assert_eq!(alloc.next(), 42);
    }

    #[test]
    fn concurrent_tokens_are_distinct_and_increasing_per_thread() {
        let alloc = Arc::new(NamingAllocator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let alloc = Arc::clone(&alloc);
                std::thread::spawn(move || (0..500).map(|_| alloc.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for h in handles {
            let seen = h.join().unwrap();
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            for t in seen {
                assert!(all.insert(t), "token {} handed out twice", t);
            }
        }
        assert_eq!(all.len(), 8 * 500);
        assert_eq!(alloc.last(), 8 * 500);
    }
}
