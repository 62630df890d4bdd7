pub mod json_ld;
pub mod jwt;

#[cfg(any(test, feature = "mock"))]
pub mod common {
    use crate::credential_formatter::model::SignatureProvider;
    use crate::crypto::SignerError;

    /// Signature provider backed by a closure, for tests.
    #[derive(Clone)]
    pub struct MockAuth<F: Fn(&[u8]) -> Vec<u8> + Send + Sync>(pub F);

    #[async_trait::async_trait]
    impl<F: Fn(&[u8]) -> Vec<u8> + Send + Sync> SignatureProvider for MockAuth<F> {
        async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
            Ok(self.0(message))
        }
        fn get_key_id(&self) -> Option<String> {
            Some("did:web:issuer#key0".to_owned())
        }
        fn get_public_key(&self) -> Vec<u8> {
            vec![]
        }
    }
}
