pub mod config;
pub mod error;
pub mod inference;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod studio;

pub use config::{Config, HuggingFaceConfig};
pub use error::{GenerationError, Result, StudioError};
pub use inference::{HuggingFaceClient, InferenceBackend};
pub use models::{GenerationRequest, GenerationResult, ImageSize, StyleEntry};
pub use studio::{
    apply, Action, HistoryList, Notice, NoticeLevel, SessionState, Studio, StyleCatalog,
};
