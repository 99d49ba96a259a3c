//! RNG helpers separating reproducible key sheets from fresh keys.
//!
//! A key derived from a passphrase is hashed with BLAKE3 into the seed of a
//! `ChaCha20Rng`, so the same passphrase always yields the same settings.
//! Fresh keys come from the OS-backed `OsRng`.

use blake3::Hasher;
use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

/// Convenience alias for the OS-backed RNG used for fresh keys.
pub type SecureRng = OsRng;

/// Deterministic RNG derived from a passphrase and a label.
pub fn derive_key_rng(seed: &[u8], label: &[u8]) -> ChaCha20Rng {
    let mut hasher = Hasher::new();
    hasher.update(b"enigma::key-sheet");
    hasher.update(seed);
    hasher.update(label);
    ChaCha20Rng::from_seed(*hasher.finalize().as_bytes())
}

pub fn secure_rng() -> SecureRng {
    OsRng
}
