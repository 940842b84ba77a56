//! Reviewer feedback command handlers for the CLI.

use std::path::Path;

use clap::Subcommand;
use postlens_generator::{FeedbackFields, FeedbackStore};

/// Sub-commands available under `feedback`.
#[derive(Debug, Subcommand)]
pub enum FeedbackCommands {
    /// Record feedback for a generated post, replacing any earlier entry
    Add {
        /// Generated post id (e.g. `post_trend_1_20240515_164500`)
        #[arg(long)]
        post_id: String,
        #[arg(long)]
        tone: Option<String>,
        #[arg(long)]
        cta: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        other: Option<String>,
    },
    /// Show all stored feedback
    List,
}

/// # Errors
///
/// Returns an error if the post id is blank, every field is blank, or the
/// store cannot be written.
pub(crate) fn run_feedback_add(
    path: &Path,
    post_id: &str,
    fields: FeedbackFields,
) -> anyhow::Result<()> {
    let store = FeedbackStore::new(path);
    let merged = store.apply(post_id, fields.into_map())?;
    println!(
        "saved feedback for {} ({} posts with feedback)",
        post_id.trim(),
        merged.len()
    );
    Ok(())
}

pub(crate) fn run_feedback_list(path: &Path) {
    let feedback = FeedbackStore::new(path).load();
    if feedback.is_empty() {
        println!("no feedback recorded");
        return;
    }
    for (post_id, fields) in &feedback {
        println!("{post_id}");
        for (field, text) in fields {
            println!("  {field}: {text}");
        }
    }
}
