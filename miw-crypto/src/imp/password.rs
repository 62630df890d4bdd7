use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

pub const DEFAULT_ROUNDS: u32 = 600_000;

/// PBKDF2-HMAC-SHA256 of the key store passphrase.
pub fn derive_key_with_salt(passphrase: &str, salt: &[u8], rounds: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, rounds, &mut key);
    key
}
