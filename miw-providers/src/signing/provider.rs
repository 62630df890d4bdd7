use std::{collections::HashMap, sync::Arc};

use super::{error::SigningServiceError, SigningService, SigningServiceType};

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait SigningServiceProvider: Send + Sync {
    fn get_signing_service(
        &self,
        service_type: SigningServiceType,
    ) -> Result<Arc<dyn SigningService>, SigningServiceError>;
}

pub struct SigningServiceProviderImpl {
    services: HashMap<SigningServiceType, Arc<dyn SigningService>>,
}

impl SigningServiceProviderImpl {
    pub fn new(services: HashMap<SigningServiceType, Arc<dyn SigningService>>) -> Self {
        Self { services }
    }
}

impl SigningServiceProvider for SigningServiceProviderImpl {
    fn get_signing_service(
        &self,
        service_type: SigningServiceType,
    ) -> Result<Arc<dyn SigningService>, SigningServiceError> {
        self.services
            .get(&service_type)
            .cloned()
            .ok_or(SigningServiceError::MissingSigningService(service_type))
    }
}
