//! Per-session state and the actions that move it forward.
//!
//! Every user interaction is expressed as an [`Action`] and applied with
//! [`apply`], which never touches the input state. Randomness and the
//! inference call happen outside and arrive as action payloads, so the
//! whole state machine can be driven from tests without a server.

use crate::{
    error::{GenerationError, Result, StudioError},
    models::{GenerationResult, ImageSize},
    studio::{
        catalog::{StyleCatalog, NO_STYLE},
        history::HistoryList,
    },
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Message shown on the next render only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            detail: None,
        }
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            title: title.into(),
            detail: None,
        }
    }

    pub fn error(title: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            detail,
        }
    }
}

impl From<&StudioError> for Notice {
    fn from(err: &StudioError) -> Self {
        match err {
            StudioError::EmptyPrompt | StudioError::GenerationInProgress => {
                Notice::warning(err.to_string())
            }
            StudioError::Generation(gen_err) => Notice::from(gen_err),
            other => Notice::error(other.to_string(), None),
        }
    }
}

impl From<&GenerationError> for Notice {
    fn from(err: &GenerationError) -> Self {
        Notice::error(err.headline(), Some(err.guidance().to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub prompt_draft: String,
    pub negative_prompt: String,
    pub style: String,
    pub size: ImageSize,
    pub last_result: Option<Arc<GenerationResult>>,
    pub history: HistoryList,
    pub notice: Option<Notice>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            prompt_draft: String::new(),
            negative_prompt: String::new(),
            style: NO_STYLE.to_string(),
            size: ImageSize::default(),
            last_result: None,
            history: HistoryList::new(),
            notice: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// A result the session still shows, either as the latest image or in
    /// its history.
    pub fn find_result(&self, id: Uuid) -> Option<&GenerationResult> {
        self.last_result
            .as_deref()
            .filter(|result| result.id == id)
            .or_else(|| self.history.find(id))
    }

    /// Hand out the pending notice, leaving none behind.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    EditPrompt(String),
    EditNegativePrompt(String),
    ChangeStyle(String),
    ChangeSize(ImageSize),
    PickRandomPrompt(String),
    GenerationSucceeded(Arc<GenerationResult>),
    GenerationFailed(GenerationError),
    ReuseHistoryItem(usize),
    RemoveHistoryItem(usize),
    ClearHistory,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::EditPrompt(_) => "edit_prompt",
            Action::EditNegativePrompt(_) => "edit_negative_prompt",
            Action::ChangeStyle(_) => "change_style",
            Action::ChangeSize(_) => "change_size",
            Action::PickRandomPrompt(_) => "pick_random_prompt",
            Action::GenerationSucceeded(_) => "generation_succeeded",
            Action::GenerationFailed(_) => "generation_failed",
            Action::ReuseHistoryItem(_) => "reuse_history_item",
            Action::RemoveHistoryItem(_) => "remove_history_item",
            Action::ClearHistory => "clear_history",
        }
    }
}

/// Compute the state that follows `action`. On error `state` is still the
/// current state.
pub fn apply(state: &SessionState, action: Action) -> Result<SessionState> {
    let mut next = state.clone();

    match action {
        Action::EditPrompt(prompt) => next.prompt_draft = prompt,
        Action::EditNegativePrompt(negative) => next.negative_prompt = negative,
        Action::ChangeStyle(style) => {
            if !StyleCatalog::global().contains(&style) {
                return Err(StudioError::UnknownStyle(style));
            }
            next.style = style;
        }
        Action::ChangeSize(size) => next.size = size,
        Action::PickRandomPrompt(prompt) => next.prompt_draft = prompt,
        Action::GenerationSucceeded(result) => {
            next.last_result = Some(Arc::clone(&result));
            next.history.insert(result);
            next.notice = Some(Notice::success("Image generated successfully!"));
        }
        Action::GenerationFailed(err) => next.notice = Some(Notice::from(&err)),
        Action::ReuseHistoryItem(index) => {
            next.prompt_draft = state.history.get(index)?.raw_prompt.clone();
        }
        Action::RemoveHistoryItem(index) => {
            next.history.remove(index)?;
        }
        Action::ClearHistory => next.history.clear(),
    }

    Ok(next)
}
