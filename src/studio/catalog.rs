use crate::{
    error::{Result, StudioError},
    models::StyleEntry,
};
use once_cell::sync::Lazy;

pub const NO_STYLE: &str = "None";

static STYLE_CATALOG: Lazy<StyleCatalog> = Lazy::new(StyleCatalog::builtin);

/// Fixed style name -> prompt suffix mapping. Suffixes carry their own
/// leading separator.
#[derive(Debug, Clone)]
pub struct StyleCatalog {
    entries: Vec<StyleEntry>,
}

impl StyleCatalog {
    pub fn global() -> &'static StyleCatalog {
        &STYLE_CATALOG
    }

    fn builtin() -> Self {
        let entries = [
            (NO_STYLE, ""),
            (
                "Anime",
                ", anime style, vibrant colors, Studio Ghibli inspired, detailed illustration, hand-drawn",
            ),
            (
                "Photorealistic",
                ", photorealistic, highly detailed, 8k resolution, professional photography, sharp focus",
            ),
            (
                "Digital Art",
                ", digital art, trending on artstation, concept art, highly detailed, vivid colors",
            ),
            (
                "Oil Painting",
                ", oil painting, classical art, rich textures, visible brushstrokes, museum quality",
            ),
            (
                "Watercolor",
                ", watercolor painting, soft colors, flowing pigments, artistic, paper texture",
            ),
            (
                "Cyberpunk",
                ", cyberpunk style, neon lights, futuristic, high tech, dark atmosphere, blade runner aesthetic",
            ),
            (
                "Fantasy",
                ", fantasy art, magical, ethereal lighting, epic composition, highly detailed",
            ),
            (
                "3D Render",
                ", 3D render, octane render, unreal engine, volumetric lighting, ultra detailed",
            ),
            (
                "Pixel Art",
                ", pixel art, 16-bit, retro game style, crisp pixels, limited palette",
            ),
        ]
        .into_iter()
        .map(|(name, suffix)| StyleEntry::new(name, suffix))
        .collect();

        Self { entries }
    }

    pub fn resolve(&self, style_name: &str) -> Result<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == style_name)
            .map(|entry| entry.suffix.as_str())
            .ok_or_else(|| StudioError::UnknownStyle(style_name.to_string()))
    }

    pub fn contains(&self, style_name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == style_name)
    }

    pub fn entries(&self) -> &[StyleEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}
