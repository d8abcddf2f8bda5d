pub mod artifact;
pub mod catalog;
pub mod history;
pub mod prompt;
pub mod request;
pub mod session;

use crate::{
    config::HuggingFaceConfig,
    error::{GenerationError, Result},
    inference::{HuggingFaceClient, InferenceBackend},
    models::{GenerationRequest, GenerationResult},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub use catalog::StyleCatalog;
pub use history::{HistoryList, HISTORY_CAPACITY};
pub use session::{apply, Action, Notice, NoticeLevel, SessionState};

/// Entry point for the generation flow. One instance is shared by every
/// session; it holds no per-session data.
#[derive(Clone)]
pub struct Studio {
    backend: Arc<dyn InferenceBackend>,
    model: String,
}

impl Studio {
    pub fn new(backend: Arc<dyn InferenceBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn from_config(config: &HuggingFaceConfig) -> Result<Self> {
        let client = HuggingFaceClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn catalog(&self) -> &'static StyleCatalog {
        StyleCatalog::global()
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Validate the draft and build the request the backend would receive.
    pub fn prepare(&self, state: &SessionState) -> Result<GenerationRequest> {
        prompt::ensure_prompt(&state.prompt_draft)?;
        let suffix = self.catalog().resolve(&state.style)?;
        let enhanced = prompt::compose(&state.prompt_draft, suffix);

        Ok(request::build_request(
            enhanced,
            self.model.as_str(),
            state.size,
            &state.negative_prompt,
        ))
    }

    async fn invoke(
        &self,
        state: &SessionState,
        request: GenerationRequest,
    ) -> std::result::Result<GenerationResult, GenerationError> {
        let raster = self.backend.text_to_image(&request).await?;
        let png = artifact::encode_png(&raster)?;

        Ok(GenerationResult {
            id: Uuid::new_v4(),
            png: png.bytes,
            width: png.width,
            height: png.height,
            raw_prompt: state.prompt_draft.clone(),
            enhanced_prompt: request.prompt,
            style: state.style.clone(),
            size: state.size,
            negative_prompt: request.negative_prompt,
            created_at: Utc::now(),
        })
    }

    /// Run one generation for the draft in `state` and return the action
    /// that records its outcome. Only validation errors come back as `Err`;
    /// backend failures become [`Action::GenerationFailed`].
    ///
    /// The action is not applied here, so the caller can reduce it into
    /// whatever the session holds once the call returns.
    pub async fn run_generation(&self, state: &SessionState) -> Result<Action> {
        let request = self.prepare(state).map_err(|err| {
            log::warn!("Generation blocked: {}", err);
            err
        })?;

        let action = match self.invoke(state, request).await {
            Ok(result) => {
                log::info!(
                    "Generated {}x{} image ({} bytes, style: {})",
                    result.width,
                    result.height,
                    result.png.len(),
                    result.style
                );
                Action::GenerationSucceeded(Arc::new(result))
            }
            Err(err) => {
                log::error!("Image generation failed: {}", err);
                Action::GenerationFailed(err)
            }
        };

        Ok(action)
    }

    /// Run one generation for `state`. Failures never escape: they are
    /// reported through the returned state's notice and leave the history
    /// untouched.
    pub async fn generate(&self, state: &SessionState) -> SessionState {
        self.run_generation(state)
            .await
            .and_then(|action| session::apply(state, action))
            .unwrap_or_else(|err| state.clone().with_notice(Notice::from(&err)))
    }

    pub fn pick_random_prompt(&self, state: &SessionState) -> Result<SessionState> {
        session::apply(
            state,
            Action::PickRandomPrompt(prompt::random_prompt().to_string()),
        )
    }
}
