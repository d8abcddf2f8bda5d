use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    #[default]
    Square,
    Portrait,
    Landscape,
}

impl ImageSize {
    pub const ALL: [ImageSize; 3] = [ImageSize::Square, ImageSize::Portrait, ImageSize::Landscape];

    /// (width, height) in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ImageSize::Square => (512, 512),
            ImageSize::Portrait => (512, 768),
            ImageSize::Landscape => (768, 512),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageSize::Square => "Square (512x512)",
            ImageSize::Portrait => "Portrait (512x768)",
            ImageSize::Landscape => "Landscape (768x512)",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ImageSize::Square => "square",
            ImageSize::Portrait => "portrait",
            ImageSize::Landscape => "landscape",
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ImageSize {
    type Err = StudioError;

    /// Accepts either the form key or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageSize::ALL
            .into_iter()
            .find(|size| size.key() == s || size.label() == s)
            .ok_or_else(|| StudioError::UnknownSize(s.to_string()))
    }
}

/// Parameters handed to the inference backend for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub negative_prompt: Option<String>,
}

/// One successful generation. Shared between the history and the
/// last-result slot, never modified after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub id: Uuid,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub raw_prompt: String,
    pub enhanced_prompt: String,
    pub style: String,
    pub size: ImageSize,
    pub negative_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl GenerationResult {
    pub fn size_label(&self) -> &'static str {
        self.size.label()
    }

    pub fn caption(&self) -> String {
        let mut caption = format!("Prompt: {}\nSize: {}", self.raw_prompt, self.size_label());
        if let Some(negative) = &self.negative_prompt {
            caption.push_str(&format!("\nNegative Prompt: {}", negative));
        }
        caption
    }

    /// Path the page loads this image from.
    pub fn image_path(&self) -> String {
        format!("/images/{}", self.id)
    }
}
