use crate::{
    error::{Result, StudioError},
    models::{GenerationResult, ImageSize},
    studio::{artifact, Notice, SessionState, Studio, HISTORY_CAPACITY},
};
use minijinja::{context, Environment};
use serde::Serialize;

const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

const NEGATIVE_PROMPT_EXAMPLES: [&str; 4] = [
    "blurry, low quality, distorted, deformed",
    "dark, gloomy, scary, horror",
    "text, watermark, signature, logo",
    "ugly, bad anatomy, poorly drawn",
];

#[derive(Serialize)]
struct ChoiceView {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Serialize)]
struct LatestView {
    caption: String,
    enhanced_prompt: String,
    style: String,
    image_url: String,
    download_url: &'static str,
    filename: &'static str,
}

#[derive(Serialize)]
struct HistoryView {
    index: usize,
    number: usize,
    raw_prompt: String,
    style: String,
    size: &'static str,
    created_at: String,
    image_url: String,
    download_url: String,
    filename: String,
}

impl HistoryView {
    fn new(index: usize, result: &GenerationResult) -> Self {
        Self {
            index,
            number: index + 1,
            raw_prompt: result.raw_prompt.clone(),
            style: result.style.clone(),
            size: result.size_label(),
            created_at: result.created_at.format("%H:%M:%S").to_string(),
            image_url: result.image_path(),
            download_url: format!("/download/history/{}", index),
            filename: artifact::history_filename(index),
        }
    }
}

#[derive(Serialize)]
struct PageView {
    model: String,
    prompt_draft: String,
    negative_prompt: String,
    styles: Vec<ChoiceView>,
    sizes: Vec<ChoiceView>,
    notice: Option<Notice>,
    generating: bool,
    latest: Option<LatestView>,
    history: Vec<HistoryView>,
    history_capacity: usize,
    negative_examples: &'static [&'static str],
}

impl PageView {
    fn build(
        studio: &Studio,
        state: &SessionState,
        notice: Option<Notice>,
        generating: bool,
    ) -> Self {
        let styles = studio
            .catalog()
            .names()
            .map(|name| ChoiceView {
                value: name.to_string(),
                label: name.to_string(),
                selected: name == state.style,
            })
            .collect();

        let sizes = ImageSize::ALL
            .iter()
            .map(|size| ChoiceView {
                value: size.key().to_string(),
                label: size.label().to_string(),
                selected: *size == state.size,
            })
            .collect();

        let latest = state.last_result.as_deref().map(|result| LatestView {
            caption: result.caption(),
            enhanced_prompt: result.enhanced_prompt.clone(),
            style: result.style.clone(),
            image_url: result.image_path(),
            download_url: "/download/latest",
            filename: artifact::LATEST_FILENAME,
        });

        let history = state
            .history
            .iter()
            .map(|(index, result)| HistoryView::new(index, result))
            .collect();

        Self {
            model: studio.model().to_string(),
            prompt_draft: state.prompt_draft.clone(),
            negative_prompt: state.negative_prompt.clone(),
            styles,
            sizes,
            notice,
            generating,
            latest,
            history,
            history_capacity: HISTORY_CAPACITY,
            negative_examples: &NEGATIVE_PROMPT_EXAMPLES,
        }
    }
}

/// HTML renderer. Templates ending in `.html` are auto-escaped.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)
            .map_err(|e| StudioError::Template(e.to_string()))?;
        Ok(Self { env })
    }

    pub fn render_index(
        &self,
        studio: &Studio,
        state: &SessionState,
        notice: Option<Notice>,
        generating: bool,
    ) -> Result<String> {
        let page = PageView::build(studio, state, notice, generating);
        self.env
            .get_template("index.html")
            .and_then(|template| template.render(context! { page => page }))
            .map_err(|e| StudioError::Template(e.to_string()))
    }
}
