use crate::{error::GenerationError, models::GenerationRequest};
use async_trait::async_trait;

/// Text-to-image collaborator. Returns raw raster bytes in whatever format
/// the provider produced.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn text_to_image(&self, request: &GenerationRequest)
        -> Result<Vec<u8>, GenerationError>;

    fn name(&self) -> &str;
}
