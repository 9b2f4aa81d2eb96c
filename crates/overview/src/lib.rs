//! Natural-language overview generation over batches of reviews.
//!
//! The summarizer partitions reviews into fixed-size contiguous batches and
//! folds them, in order, through a chat-model call that carries one evolving
//! summary forward. Each raw model response is post-processed from XML-style
//! tagged sections into Markdown before it is carried into the next call.
//!
//! The fold is inherently serial: every call's prompt depends on the previous
//! call's output, so batches must never be processed in parallel.

mod chat;
mod markdown;
mod prompt;
mod summarizer;

pub use chat::{AnthropicChat, ChatConfig, ChatError, ChatModel};
pub use markdown::{render_markdown, ParseError};
pub use summarizer::{summarize, AppContext, SummarizerConfig};

use thiserror::Error;

/// Errors produced while generating an overview.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OverviewError {
    /// Batch size of zero would loop forever; rejected up front.
    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    /// The chat-model call for a batch failed. The whole fold aborts; no
    /// partial summary is returned.
    #[error("overview generation failed: {0}")]
    Generation(#[from] ChatError),

    /// The tagged model output could not be converted to Markdown.
    #[error("overview post-processing failed: {0}")]
    Parse(#[from] ParseError),
}
