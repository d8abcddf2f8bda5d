use crate::models::{GenerationRequest, ImageSize};

/// Assemble the backend parameters. A negative prompt that is blank after
/// trimming is dropped entirely; otherwise it is sent as typed.
pub fn build_request(
    enhanced_prompt: impl Into<String>,
    model: impl Into<String>,
    size: ImageSize,
    negative_prompt_raw: &str,
) -> GenerationRequest {
    let (width, height) = size.dimensions();
    let negative_prompt = if negative_prompt_raw.trim().is_empty() {
        None
    } else {
        Some(negative_prompt_raw.to_string())
    };

    GenerationRequest {
        prompt: enhanced_prompt.into(),
        model: model.into(),
        width,
        height,
        negative_prompt,
    }
}
