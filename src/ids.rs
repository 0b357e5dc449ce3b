//! Execution id generation

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Generates `<prefix>_<millis>_<9 base-36 chars>` ids
///
/// Seeded from the OS by default; [`IdGenerator::with_seed`] gives a
/// reproducible sequence for tests.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    rng: ChaCha8Rng,
}

impl IdGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Create a generator with a fixed seed
    pub fn with_seed(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Produce the next id for a record created at `millis`
    pub fn next_id(&mut self, millis: i64) -> String {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| BASE36[self.rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("{}_{}_{}", self.prefix, millis, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_id_shape() {
        let mut ids = IdGenerator::with_seed("exec", 7);
        let id = ids.next_id(1_700_000_000_000);

        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "exec");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), SUFFIX_LEN);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut a = IdGenerator::with_seed("exec", 42);
        let mut b = IdGenerator::with_seed("exec", 42);
        for i in 0..10 {
            assert_eq!(a.next_id(i), b.next_id(i));
        }
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut ids = IdGenerator::new("exec");
        let seen: HashSet<String> = (0..1_000).map(|_| ids.next_id(5)).collect();
        assert_eq!(seen.len(), 1_000);
    }
}
