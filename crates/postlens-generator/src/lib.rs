//! Trend-driven post drafting through an OpenAI-compatible chat API, plus
//! the reviewer feedback store that steers later drafts.

pub mod client;
pub mod error;
pub mod feedback;
pub mod generate;
pub mod prompt;
pub(crate) mod retry;

pub use client::{ChatClient, ChatSettings};
pub use error::GeneratorError;
pub use feedback::{Feedback, FeedbackFields, FeedbackStore, PostFeedback};
pub use generate::{generate_posts, parse_post_response, save_posts, GeneratedPost, PostReply};
pub use prompt::{
    build_prompt, suggested_hour, Prompt, DEFAULT_POSTING_DAY, DEFAULT_POSTING_HOUR,
};
