//! Google Cloud Vision `images:annotate` client.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, warn, Instrument};

use super::{PerceptionResult, PerceptionService, Photo, ScoredLabel};
use crate::config::schema::VisionConfig;
use crate::error::{ConfigError, PerceptionError};

/// Maximum length for error bodies kept in `PerceptionError::Status`.
const MAX_ERROR_BODY_LENGTH: usize = 200;

fn truncate_error_body(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_LENGTH {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
        format!("{}... (truncated)", truncated)
    } else {
        body.to_string()
    }
}

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    requests: Vec<ImageRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    image: ImageContent,
    features: Vec<Feature<'a>>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    max_results: u32,
}

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
    #[serde(default)]
    error: Option<ProviderStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    #[serde(default)]
    logo_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    error: Option<ProviderStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct LocalizedObject {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ProviderStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl From<ProviderStatus> for PerceptionError {
    fn from(status: ProviderStatus) -> Self {
        PerceptionError::Provider {
            code: status.code,
            message: status.message,
        }
    }
}

/// Decodes an `images:annotate` response body into a [`PerceptionResult`].
///
/// Only the first image response is used. A body with no responses decodes
/// to an empty result, which the classifier reports as unrecognized.
pub fn decode_annotate_response(body: &str) -> Result<PerceptionResult, PerceptionError> {
    let response: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| PerceptionError::Decode(e.to_string()))?;

    if let Some(status) = response.error {
        return Err(status.into());
    }

    let Some(image) = response.responses.into_iter().next() else {
        return Ok(PerceptionResult::default());
    };

    if let Some(status) = image.error {
        return Err(status.into());
    }

    let labels = image
        .label_annotations
        .into_iter()
        .filter(|l| !l.description.is_empty())
        .map(|l| ScoredLabel::new(l.description, l.score.unwrap_or(0.0)))
        .collect();

    // The first text annotation is the whole text block; the rest are the
    // individual words. Both are kept so short symbol fragments survive.
    let text_tokens = image
        .text_annotations
        .into_iter()
        .map(|t| t.description)
        .filter(|t| !t.is_empty())
        .collect();

    let object_names = image
        .localized_object_annotations
        .into_iter()
        .map(|o| o.name)
        .filter(|n| !n.is_empty())
        .collect();

    let logo_names = image
        .logo_annotations
        .into_iter()
        .map(|l| l.description)
        .filter(|l| !l.is_empty())
        .collect();

    Ok(PerceptionResult::new(
        labels,
        object_names,
        text_tokens,
        logo_names,
    ))
}

/// HTTP client for the Vision API.
pub struct VisionClient {
    http: Client,
    endpoint: String,
    api_key: SecretString,
    max_labels: u32,
    max_text: u32,
    max_objects: u32,
    max_logos: u32,
}

impl VisionClient {
    pub fn new(config: &VisionConfig, api_key: SecretString) -> Result<Self, PerceptionError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            max_labels: config.max_labels,
            max_text: config.max_text,
            max_objects: config.max_objects,
            max_logos: config.max_logos,
        })
    }

    /// Resolves the API key from `config` and builds the client.
    pub fn from_config(config: &VisionConfig) -> crate::error::Result<Self> {
        let api_key = crate::secrets::resolve_vision_api_key(config).map_err(ConfigError::from)?;
        Ok(Self::new(config, api_key)?)
    }

    fn build_request(&self, photo: &Photo) -> AnnotateRequest<'static> {
        let content = base64::engine::general_purpose::STANDARD.encode(&photo.bytes);
        AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent { content },
                features: vec![
                    Feature {
                        kind: "LABEL_DETECTION",
                        max_results: self.max_labels,
                    },
                    Feature {
                        kind: "TEXT_DETECTION",
                        max_results: self.max_text,
                    },
                    Feature {
                        kind: "OBJECT_LOCALIZATION",
                        max_results: self.max_objects,
                    },
                    Feature {
                        kind: "LOGO_DETECTION",
                        max_results: self.max_logos,
                    },
                ],
            }],
        }
    }

    async fn send_annotate(&self, photo: &Photo) -> Result<PerceptionResult, PerceptionError> {
        let request = self.build_request(photo);

        // Request URLs carry the API key and must not end up in errors or logs.
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&request)
            .send()
            .await
            .map_err(|e| PerceptionError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PerceptionError::Transport(e.without_url()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Vision API returned an error status");
            // Error bodies carry the provider's own status when parseable.
            if let Ok(AnnotateResponse {
                error: Some(provider),
                ..
            }) = serde_json::from_str::<AnnotateResponse>(&body)
            {
                return Err(provider.into());
            }
            return Err(PerceptionError::Status {
                status: status.as_u16(),
                body: truncate_error_body(&body),
            });
        }

        let result = decode_annotate_response(&body)?;
        debug!(
            labels = result.labels().len(),
            objects = result.object_names().len(),
            text = result.text_tokens().len(),
            logos = result.logo_names().len(),
            "Vision API annotation decoded"
        );
        Ok(result)
    }
}

#[async_trait]
impl PerceptionService for VisionClient {
    async fn annotate(&self, photo: &Photo) -> Result<PerceptionResult, PerceptionError> {
        let span = info_span!("vision.annotate", photo = %photo.name, bytes = photo.bytes.len());
        self.send_annotate(photo).instrument(span).await
    }
}
