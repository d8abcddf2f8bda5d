use crate::{
    config::HuggingFaceConfig,
    error::{GenerationError, Result},
    inference::traits::InferenceBackend,
    logger,
    models::GenerationRequest,
};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct TextToImagePayload<'a> {
    inputs: &'a str,
    parameters: TextToImageParameters<'a>,
}

#[derive(Serialize)]
struct TextToImageParameters<'a> {
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<&'a str>,
}

impl<'a> From<&'a GenerationRequest> for TextToImagePayload<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            inputs: &request.prompt,
            parameters: TextToImageParameters {
                width: request.width,
                height: request.height,
                negative_prompt: request.negative_prompt.as_deref(),
            },
        }
    }
}

pub struct HuggingFaceClient {
    http: OnceCell<Client>,
    api_base: String,
    token: String,
}

impl HuggingFaceClient {
    pub fn new(config: &HuggingFaceConfig) -> Result<Self> {
        let token = config.require_token()?.to_string();

        Ok(Self {
            http: OnceCell::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// The HTTP client is built on first use and shared afterwards.
    fn http(&self) -> std::result::Result<&Client, GenerationError> {
        self.http.get_or_try_init(|| {
            log::debug!("Building HuggingFace HTTP client");
            Client::builder()
                .user_agent(concat!("rgenai-studio/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| GenerationError::Unclassified(e.to_string()))
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}", self.api_base, model)
    }
}

/// Pull a readable message out of an error body; the API answers with
/// `{"error": "..."}` or `{"error": ["...", ...]}` but proxies may send
/// plain text.
fn error_message(status: StatusCode, body: &str) -> String {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("error") {
            Some(Value::String(msg)) => msg.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(String::from).unwrap_or_else(|| item.to_string()))
                .collect::<Vec<_>>()
                .join("; "),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.trim().to_string(),
    };

    if detail.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, detail)
    }
}

/// Map a failure that happened before a status arrived. Connection and
/// timeout problems are never attributed to the model. The message is
/// classified without the request URL, which always contains `/models/`.
fn transport_error(err: reqwest::Error) -> GenerationError {
    log::error!("HuggingFace request failed: {}", err);
    let unreachable = err.is_connect() || err.is_timeout() || err.is_request();
    let message = err.without_url().to_string();

    if unreachable {
        GenerationError::Unclassified(message)
    } else {
        GenerationError::classify(message)
    }
}

#[async_trait]
impl InferenceBackend for HuggingFaceClient {
    async fn text_to_image(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<Vec<u8>, GenerationError> {
        let url = self.endpoint(&request.model);
        let payload = TextToImagePayload::from(request);

        log::info!(
            "Generating {}x{} image with model: {}",
            request.width,
            request.height,
            request.model
        );
        log::debug!("Enhanced prompt: {}", request.prompt);
        let _timer = logger::timer("text_to_image");

        let response = self
            .http()?
            .post(&url)
            .bearer_auth(&self.token)
            .header(header::ACCEPT, "image/png")
            .json(&payload)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            log::error!("HuggingFace returned an error: {}", message);
            return Err(GenerationError::from_status(status.as_u16(), message));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;

        log::debug!("Received {} bytes of image data", bytes.len());
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::StudioError, models::ImageSize, studio::request::build_request};
    use serde_json::json;

    #[test]
    fn test_payload_omits_blank_negative_prompt() {
        let request = build_request("A cat", "m", ImageSize::Portrait, "   ");
        let payload = serde_json::to_value(TextToImagePayload::from(&request)).unwrap();
        assert_eq!(
            payload,
            json!({"inputs": "A cat", "parameters": {"width": 512, "height": 768}})
        );
    }

    #[test]
    fn test_payload_with_negative_prompt() {
        let request = build_request("A cat", "m", ImageSize::Square, "blurry");
        let payload = serde_json::to_value(TextToImagePayload::from(&request)).unwrap();
        assert_eq!(payload["parameters"]["negative_prompt"], "blurry");
    }

    #[test]
    fn test_requires_token() {
        assert!(matches!(
            HuggingFaceClient::new(&HuggingFaceConfig::new()),
            Err(StudioError::CredentialMissing)
        ));
    }

    #[test]
    fn test_endpoint() {
        let config = HuggingFaceConfig::new()
            .with_token("hf_test")
            .with_api_base("https://example.test/hf/");
        let client = HuggingFaceClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("black-forest-labs/FLUX.1-schnell"),
            "https://example.test/hf/models/black-forest-labs/FLUX.1-schnell"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_not_a_model_error() {
        let config = HuggingFaceConfig::new()
            .with_token("hf_test")
            .with_api_base("http://127.0.0.1:1/hf-inference");
        let client = HuggingFaceClient::new(&config).unwrap();
        let request = build_request(
            "A cat",
            "black-forest-labs/FLUX.1-schnell",
            ImageSize::Square,
            "",
        );

        let err = client.text_to_image(&request).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unclassified(_)), "{:?}", err);
        assert!(!err.message().contains("/models/"));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, r#"{"error":"Model is loading"}"#),
            "503 Service Unavailable: Model is loading"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":["a","b"]}"#),
            "400 Bad Request: a; b"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "  "),
            "502 Bad Gateway"
        );
    }
}
