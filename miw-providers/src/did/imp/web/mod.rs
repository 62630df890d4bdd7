//! `did:web` resolution.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::{
    common_models::did::{Bpn, DidValue},
    did::{error::DidResolverError, model::DidDocument, DidResolver},
    http_client::HttpClient,
};


#[derive(Debug, Clone, Default)]
pub struct Params {
    pub resolve_to_insecure_http: bool,
}

pub struct WebDidResolver {
    client: Arc<dyn HttpClient>,
    params: Params,
}

impl WebDidResolver {
    pub fn new(client: Arc<dyn HttpClient>, params: Params) -> Self {
        Self { client, params }
    }

    /// The `did:web` identifier a wallet hosted under `base_url` gets for `bpn`.
    pub fn did_for(base_url: &str, bpn: &Bpn) -> Result<DidValue, DidResolverError> {
        let url = Url::parse(base_url).map_err(|e| DidResolverError::InvalidDid(e.to_string()))?;

        let mut host = url
            .host_str()
            .ok_or(DidResolverError::InvalidDid("Missing host".to_string()))?
            .to_owned();
        if let Some(port) = url.port() {
            host.push_str(&format!("%3A{port}"));
        }

        Ok(DidValue::from(format!("did:web:{host}:{bpn}")))
    }
}

#[async_trait]
impl DidResolver for WebDidResolver {
    async fn resolve(&self, did: &DidValue) -> Result<DidDocument, DidResolverError> {
        let url = did_value_to_url(did, self.params.resolve_to_insecure_http)?;
        tracing::debug!(%did, %url, "resolving did:web document");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                DidResolverError::ResolutionError(format!("Could not fetch did document: {e}"))
            })?;

        let document: DidDocument = response.json().map_err(|e| {
            DidResolverError::ResolutionError(format!("Could not parse did document: {e}"))
        })?;

        if &document.id != did {
            return Err(DidResolverError::ResolutionError(format!(
                "document id `{}` does not match `{did}`",
                document.id
            )));
        }

        Ok(document)
    }
}

fn did_value_to_url(did_value: &DidValue, resolve_to_http: bool) -> Result<Url, DidResolverError> {
    let core_value = did_value.as_str().strip_prefix("did:web:").ok_or_else(|| {
        match did_value.method() {
            Some(method) => DidResolverError::UnsupportedMethod(method.to_owned()),
            None => DidResolverError::InvalidDid(did_value.to_string()),
        }
    })?;

    let mut path_parts = core_value.split(':');
    let host = path_parts
        .next()
        .filter(|host| !host.is_empty())
        .ok_or(DidResolverError::InvalidDid(
            "Missing host part in a did value".to_string(),
        ))?;

    let scheme = if resolve_to_http { "http" } else { "https" };

    // port separator is the only percent encoded character expected here
    let host = format!("{scheme}://{}", host.replace("%3A", ":"));

    let mut url = Url::parse(&host).map_err(|e| DidResolverError::InvalidDid(e.to_string()))?;

    let remaining_parts: Vec<&str> = path_parts.collect();

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| DidResolverError::InvalidDid(did_value.to_string()))?;

        if remaining_parts.is_empty() {
            segments.push(".well-known");
        } else {
            segments.extend(remaining_parts);
        }

        segments.push("did.json");
    }

    Ok(url)
}
