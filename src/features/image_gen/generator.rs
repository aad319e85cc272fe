//! Image-generation dispatch variant.
//!
//! One POST per invocation, bearer-authenticated, asking for `n` images as
//! base64 JSON. A success is exactly `n` entries, order preserved, each
//! wrapped as a `data:image/jpeg;base64,...` resource; anything short of
//! that is surfaced as a single API failure.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::dispatch::DispatchError;

/// Parameters for one image-generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub count: u32,
}

impl ImageRequest {
    /// Deployment defaults: FLUX.1-schnell, 1024x768, 4 steps, 4 images.
    pub fn new(prompt: &str) -> Self {
        ImageRequest {
            model: "black-forest-labs/FLUX.1-schnell".to_string(),
            prompt: prompt.to_string(),
            width: 1024,
            height: 768,
            steps: 4,
            count: 4,
        }
    }
}

/// One generated image, ready for display as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    data_url: String,
}

impl GeneratedImage {
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Suggested name when saving the image at position `index`.
    pub fn suggested_file_name(index: usize) -> String {
        format!("generated-image-{}.jpg", index + 1)
    }
}

#[derive(Serialize)]
struct ImageRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
    n: u32,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Option<Vec<ImageEntry>>,
}

#[derive(Debug, Deserialize)]
struct ImageEntry {
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Error)]
enum ResponseError {
    #[error("Failed to generate images")]
    Incomplete,
}

/// Client for the image-generation endpoint.
#[derive(Debug, Clone)]
pub struct ImageGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ImageGenerator {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        ImageGenerator {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Generate `request.count` images. No retries.
    pub async fn generate(
        &self,
        request: &ImageRequest,
    ) -> Result<Vec<GeneratedImage>, DispatchError> {
        debug!(
            "POST {} ({}x{}, {} steps, n={})",
            self.endpoint, request.width, request.height, request.steps, request.count
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ImageRequestBody {
                model: &request.model,
                prompt: &request.prompt,
                width: request.width,
                height: request.height,
                steps: request.steps,
                n: request.count,
                response_format: "b64_json",
            })
            .send()
            .await
            .map_err(|e| DispatchError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::api(format!(
                "HTTP {} - {body}",
                status.as_u16()
            )));
        }

        let payload: ImageResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::transport(e.to_string()))?;

        let images = collect_images(payload, request.count)
            .map_err(|e| DispatchError::api(e.to_string()))?;
        info!("Generated {} images for prompt", images.len());
        Ok(images)
    }
}

/// Wrap the response entries as data URLs, demanding exactly `expected` of
/// them in response order.
fn collect_images(
    response: ImageResponse,
    expected: u32,
) -> Result<Vec<GeneratedImage>, ResponseError> {
    let entries = response.data.ok_or(ResponseError::Incomplete)?;
    if entries.is_empty() || entries.len() != expected as usize {
        return Err(ResponseError::Incomplete);
    }

    entries
        .into_iter()
        .map(|entry| {
            entry
                .b64_json
                .map(|b64| GeneratedImage {
                    data_url: format!("data:image/jpeg;base64,{b64}"),
                })
                .ok_or(ResponseError::Incomplete)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_from(value: serde_json::Value) -> ImageResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn four_entries_yield_four_images_in_order() {
        let response = response_from(json!({
            "data": [
                {"b64_json": "AAAA"},
                {"b64_json": "BBBB"},
                {"b64_json": "CCCC"},
                {"b64_json": "DDDD"},
            ]
        }));

        let images = collect_images(response, 4).unwrap();
        assert_eq!(images.len(), 4);
        assert_eq!(images[0].data_url(), "data:image/jpeg;base64,AAAA");
        assert_eq!(images[3].data_url(), "data:image/jpeg;base64,DDDD");
    }

    #[test]
    fn missing_data_array_is_a_generation_failure() {
        let response = response_from(json!({"id": "req-1"}));
        let err = collect_images(response, 4).unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate images");
    }

    #[test]
    fn empty_data_array_is_a_generation_failure() {
        let response = response_from(json!({"data": []}));
        assert!(collect_images(response, 4).is_err());
    }

    #[test]
    fn short_response_is_a_generation_failure() {
        let response = response_from(json!({
            "data": [{"b64_json": "AAAA"}, {"b64_json": "BBBB"}]
        }));
        assert!(collect_images(response, 4).is_err());
    }

    #[test]
    fn entry_without_payload_is_a_generation_failure() {
        let response = response_from(json!({
            "data": [{"b64_json": "AAAA"}, {"revised_prompt": "x"}]
        }));
        assert!(collect_images(response, 2).is_err());
    }

    #[test]
    fn request_defaults_match_the_deployment() {
        let request = ImageRequest::new("a lighthouse at dusk");
        assert_eq!(request.model, "black-forest-labs/FLUX.1-schnell");
        assert_eq!(request.prompt, "a lighthouse at dusk");
        assert_eq!((request.width, request.height), (1024, 768));
        assert_eq!(request.steps, 4);
        assert_eq!(request.count, 4);
    }

    #[test]
    fn suggested_file_names_are_one_based() {
        assert_eq!(
            GeneratedImage::suggested_file_name(0),
            "generated-image-1.jpg"
        );
        assert_eq!(
            GeneratedImage::suggested_file_name(3),
            "generated-image-4.jpg"
        );
    }
}
