use crate::{Signer, SignerError};

pub const EDDSA_SIGNER_ID: &str = "Ed25519";

pub struct EDDSASigner {}

impl EDDSASigner {
    /// Accepts either the 64 byte keypair encoding or a bare 32 byte seed.
    fn key_pair(private_key: &[u8]) -> Result<ed25519_compact::KeyPair, SignerError> {
        match private_key.len() {
            ed25519_compact::Seed::BYTES => {
                let seed = ed25519_compact::Seed::from_slice(private_key)
                    .map_err(|_| SignerError::CouldNotExtractKeyPair)?;
                Ok(ed25519_compact::KeyPair::from_seed(seed))
            }
            _ => ed25519_compact::KeyPair::from_slice(private_key)
                .map_err(|_| SignerError::CouldNotExtractKeyPair),
        }
    }

    /// Returns `(private, public)`, the private half in the 64 byte keypair encoding.
    pub fn random() -> (Vec<u8>, Vec<u8>) {
        let key_pair = ed25519_compact::KeyPair::generate();
        (key_pair.sk.to_vec(), key_pair.pk.to_vec())
    }
}

impl Signer for EDDSASigner {
    fn sign(
        &self,
        input: &[u8],
        public_key: &[u8],
        private_key: &[u8],
    ) -> Result<Vec<u8>, SignerError> {
        let ed25519_kp = Self::key_pair(private_key)?;

        if ed25519_kp.pk.as_slice() != public_key {
            return Err(SignerError::CouldNotExtractKeyPair);
        }

        Ok(ed25519_kp.sk.sign(input, None).to_vec())
    }

    fn verify(&self, input: &[u8], signature: &[u8], public_key: &[u8]) -> Result<(), SignerError> {
        let ed25519_pk = ed25519_compact::PublicKey::from_slice(public_key)
            .map_err(|e| SignerError::CouldNotExtractPublicKey(e.to_string()))?;

        let ed25519_signature = ed25519_compact::Signature::from_slice(signature)
            .map_err(|e| SignerError::CouldNotVerify(e.to_string()))?;

        ed25519_pk
            .verify(input, &ed25519_signature)
            .map_err(|_| SignerError::InvalidSignature)
    }

    fn public_key_from_private(&self, private_key: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(Self::key_pair(private_key)?.pk.to_vec())
    }
}
