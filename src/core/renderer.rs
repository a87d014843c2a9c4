use crate::core::template;
use crate::core::{ConfigProvider, Document, PetCollection, Pipeline, RenderedList};
use crate::domain::model::PetRecord;
use crate::utils::error::{RenderError, Result};
use reqwest::Client;

pub const PETS_RESOURCE_PATH: &str = "/pets";

/// `{endpoint_url}/pets`, tolerating a trailing slash on the base.
pub fn pets_url(endpoint_url: &str) -> String {
    format!("{}{}", endpoint_url.trim_end_matches('/'), PETS_RESOURCE_PATH)
}

/// Decodes a `/pets` body: a JSON array whose items are all objects.
pub fn decode_pets(body: &[u8]) -> Result<PetCollection> {
    let json_data: serde_json::Value = serde_json::from_slice(body)?;

    let items = match json_data {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(RenderError::DecodeFailure {
                message: format!(
                    "expected a JSON array of pet records, got {}",
                    json_kind(&other)
                ),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(RenderError::DecodeFailure {
                    message: format!("record {} is {}, not an object", index, json_kind(&item)),
                });
            }
            serde_json::from_value::<PetRecord>(item).map_err(|e| RenderError::DecodeFailure {
                message: format!("record {}: {}", index, e),
            })
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

pub struct PetListRenderer<D: Document, C: ConfigProvider> {
    document: D,
    config: C,
    client: Client,
}

impl<D: Document, C: ConfigProvider> PetListRenderer<D, C> {
    pub fn new(document: D, config: C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| RenderError::ConfigError {
            message: format!("Failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            document,
            config,
            client,
        })
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait::async_trait]
impl<D: Document, C: ConfigProvider> Pipeline for PetListRenderer<D, C> {
    async fn extract(&self) -> Result<PetCollection> {
        let url = pets_url(self.config.endpoint_url());

        tracing::debug!("Making API request to: {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| RenderError::NetworkFailure {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(RenderError::HttpStatusFailure {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| RenderError::NetworkFailure {
                url: url.clone(),
                source,
            })?;

        let pets = decode_pets(&body)?;
        tracing::debug!("Decoded {} pet records ({} bytes)", pets.len(), body.len());
        Ok(pets)
    }

    async fn transform(&self, pets: PetCollection) -> Result<RenderedList> {
        template::render_pet_list(&pets)
    }

    async fn load(&self, rendered: RenderedList) -> Result<usize> {
        tracing::debug!(
            "Replacing content of #{} ({} bytes of markup)",
            self.config.target_id(),
            rendered.markup.len()
        );
        self.document
            .replace_content(self.config.target_id(), &rendered.markup)
            .await?;
        Ok(rendered.record_count)
    }
}
