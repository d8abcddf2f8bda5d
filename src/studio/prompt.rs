use crate::error::{Result, StudioError};
use rand::seq::SliceRandom;
use rand::Rng;

pub const RANDOM_PROMPTS: [&str; 15] = [
    "A cyberpunk city at sunset, neon lights, futuristic architecture",
    "A magical forest with glowing mushrooms, ethereal lighting, fantasy art",
    "A cute robot reading a book in a library, warm lighting, detailed",
    "An astronaut riding a horse on Mars, cinematic, epic scene",
    "A steampunk airship flying over mountains, dramatic clouds, vintage",
    "A cat wearing a wizard hat casting spells, digital art, whimsical",
    "A futuristic sports car in a neon tunnel, motion blur, sci-fi",
    "A cozy treehouse in autumn, warm lighting, peaceful atmosphere",
    "A dragon sleeping on a pile of books, fantasy art, detailed scales",
    "An underwater city with bioluminescent plants, mysterious, deep ocean",
    "A coffee shop on a rainy day, cozy interior, warm colors",
    "A phoenix rising from flames, majestic, vibrant colors",
    "A samurai warrior in a cherry blossom garden, cinematic lighting",
    "A Victorian mansion at night, gothic atmosphere, moonlight",
    "A whale swimming through clouds, surreal, dreamlike",
];

/// Rejects prompts that are empty after trimming. Runs before `compose`.
pub fn ensure_prompt(raw_prompt: &str) -> Result<()> {
    if raw_prompt.trim().is_empty() {
        return Err(StudioError::EmptyPrompt);
    }
    Ok(())
}

/// Appends the style suffix verbatim; the raw prompt is not trimmed.
pub fn compose(raw_prompt: &str, style_suffix: &str) -> String {
    let mut enhanced = String::with_capacity(raw_prompt.len() + style_suffix.len());
    enhanced.push_str(raw_prompt);
    enhanced.push_str(style_suffix);
    enhanced
}

pub fn pick_random<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    RANDOM_PROMPTS
        .choose(rng)
        .copied()
        .unwrap_or(RANDOM_PROMPTS[0])
}

pub fn random_prompt() -> &'static str {
    pick_random(&mut rand::thread_rng())
}
