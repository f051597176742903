use async_trait::async_trait;

use crate::errors::client_error::ProviderError;
use crate::providers::structure::trait_structure::StructureProvider;
use crate::structure::{Identifier, StructureRecord};

/// Resolución contra el servicio remoto de estructuras:
/// `GET {base}/structure/{identifier}` devuelve el registro en JSON.
/// 404 significa "no conocido" y la cadena continúa con la generación.
pub struct RemoteLookupProvider {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteLookupProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    fn url_for(&self, identifier: &Identifier) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/structure/{}", percent_encode(identifier.normalized()))
    }
}

/// Percent-encoding del segmento de ruta: un InChI lleva '/' y '+'.
fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[async_trait]
impl StructureProvider for RemoteLookupProvider {
    fn get_name(&self) -> &str {
        "remote-lookup"
    }

    fn get_description(&self) -> &str {
        "Looks structures up in the remote structure-resolution service"
    }

    async fn resolve(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<StructureRecord>, ProviderError> {
        let url = self.url_for(identifier);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response =
            response.error_for_status().map_err(|e| ProviderError::Http(e.to_string()))?;

        let mut record: StructureRecord = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        record.provenance = self.get_name().to_string();
        Ok(Some(record))
    }
}
