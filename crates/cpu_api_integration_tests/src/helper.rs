//! Helper utilities for integration tests.

use rand::distr::{Alphanumeric, SampleString as _};

/// Generates a random alphanumeric string of the specified length.
#[must_use]
pub fn random_str(len: usize) -> String {
    let mut rng = rand::rng();
    Alphanumeric.sample_string(&mut rng, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_str_is_alphanumeric() {
        let s = random_str(32);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(s, random_str(32));
    }
}
