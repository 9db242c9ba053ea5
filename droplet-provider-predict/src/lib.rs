//! Photo classifier implementation for the water-quality prediction endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use serde::Deserialize;
use tracing::debug;

use droplet_core::{
    config::ClassifierConfig,
    model::{Classification, Photo},
    ports::{ClassifierPort, PortError},
};

/// Response from the prediction endpoint.
#[derive(Debug, Deserialize)]
struct PredictResponse {
    confidence: f64,
}

/// Classifier posting base64-encoded photos as a `photo` form field.
pub struct PredictClassifierPort {
    client: Client,
    endpoint: String,
}

impl PredictClassifierPort {
    /// Create a new classifier bound to the given HTTP client and endpoint.
    #[must_use]
    pub fn new(client: Client, config: ClassifierConfig) -> Self {
        Self {
            client,
            endpoint: config.endpoint,
        }
    }
}

#[async_trait]
impl ClassifierPort for PredictClassifierPort {
    async fn classify(&self, photo: &Photo) -> Result<Classification, PortError> {
        if photo.bytes.is_empty() {
            return Err(PortError::InvalidPhoto);
        }

        let form = Form::new().text("photo", STANDARD.encode(&photo.bytes));
        debug!(file = %photo.file_name, bytes = photo.bytes.len(), "sending photo to classifier");

        let resp = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::Backend {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }

        let body: PredictResponse = resp
            .json()
            .await
            .map_err(|err| PortError::Decode(err.to_string()))?;

        if !body.confidence.is_finite() {
            return Err(PortError::Decode(format!(
                "confidence is not a number: {}",
                body.confidence
            )));
        }

        debug!(confidence = body.confidence, "classifier answered");
        Ok(Classification {
            confidence: body.confidence,
        })
    }
}

/// Build the classifier port for the configured endpoint.
#[must_use]
pub fn classifier_port(client: Client, config: ClassifierConfig) -> Arc<dyn ClassifierPort> {
    Arc::new(PredictClassifierPort::new(client, config))
}
