use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// 32 bytes from a freshly seeded ChaCha20 generator, used to seed cocoons.
pub fn generate_random_seed_32() -> [u8; 32] {
    let mut rng = ChaCha20Rng::from_entropy();
    let mut seed = [0u8; 32];
    rng.fill_bytes(&mut seed);
    seed
}
