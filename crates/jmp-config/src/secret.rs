// secret.rs — Shared-secret generation for inter-container credentials.
//
// Secrets are 24 alphanumeric characters drawn from the OS random source.
// If that source is unavailable, a generator seeded from the clock and pid
// is used instead; these secrets never leave the container network.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

/// Length of every generated secret.
pub const SECRET_LENGTH: usize = 24;

/// Generate a fresh alphanumeric secret.
pub fn generate_secret() -> String {
    let mut seed = [0u8; 32];
    let rng = match OsRng.try_fill_bytes(&mut seed) {
        Ok(()) => StdRng::from_seed(seed),
        Err(e) => {
            tracing::warn!(error = %e, "OS random source unavailable, using weaker seed");
            StdRng::seed_from_u64(fallback_seed())
        }
    };
    rng.sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect()
}

fn fallback_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ (u64::from(std::process::id()) << 32)
}

/// Whether `value` has the shape of a generated secret.
pub fn is_valid_secret(value: &str) -> bool {
    value.len() == SECRET_LENGTH && value.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_secret_has_expected_shape() {
        for _ in 0..50 {
            assert!(is_valid_secret(&generate_secret()));
        }
    }

    #[test]
    fn generated_secrets_differ() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn shape_check_rejects_bad_values() {
        assert!(!is_valid_secret(""));
        assert!(!is_valid_secret("short"));
        assert!(!is_valid_secret("abcdefghijklmnopqrstuvw!"));
    }
}
