use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// The shared secret guarding the admin endpoints.
#[derive(Clone)]
pub struct AdminToken(Arc<str>);

impl AdminToken {
    /// Returns `None` for a blank secret. Otherwise the secret is kept exactly as given.
    pub fn new(secret: &str) -> Option<Self> {
        if secret.trim().is_empty() {
            return None;
        }
        Some(Self(Arc::from(secret)))
    }

    /// Exact, constant-time comparison against the configured secret.
    pub fn verify(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        if expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminToken(***)")
    }
}

pub fn generate(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
