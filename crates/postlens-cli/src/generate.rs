//! `generate`: draft posts from the saved trend summary.

use std::path::Path;

use chrono::Local;
use postlens_core::storage::read_trends;
use postlens_core::{AppConfig, StorageError, TrendSummary};
use postlens_generator::{
    generate_posts, save_posts, ChatClient, ChatSettings, Feedback, FeedbackStore, GeneratedPost,
};

/// Draft `count` posts, save them to `output` and print them.
///
/// A missing trend summary falls back to the generic prompt.
///
/// # Errors
///
/// Returns an error if no API key is configured, the trend summary is
/// malformed, or the posts cannot be saved. Failed completions are kept in
/// the output with their error set.
pub(crate) async fn run_generate(
    config: &AppConfig,
    count: u32,
    with_feedback: bool,
    output: &Path,
) -> anyhow::Result<()> {
    let settings = ChatSettings::from_app_config(config)?;
    let client = ChatClient::new(settings)
        .map_err(|e| anyhow::anyhow!("failed to build chat client: {e}"))?;

    let trends = load_trends_or_default(&config.trends_path())?;
    let feedback = if with_feedback {
        FeedbackStore::new(config.feedback_path()).load()
    } else {
        Feedback::new()
    };

    let count = usize::try_from(count)?;
    let posts = generate_posts(
        &client,
        &trends,
        &feedback,
        &config.author,
        count,
        Local::now().naive_local(),
    )
    .await;

    save_posts(output, &posts)?;
    for post in &posts {
        print_post(post);
    }

    let failed = posts.iter().filter(|p| p.error.is_some()).count();
    println!(
        "generated {} posts ({failed} with errors) into {}",
        posts.len(),
        output.display()
    );
    Ok(())
}

fn load_trends_or_default(path: &Path) -> anyhow::Result<TrendSummary> {
    match read_trends(path) {
        Ok(trends) => Ok(trends),
        Err(StorageError::MissingInput { path }) => {
            tracing::warn!(
                path = %path.display(),
                "no trend summary found; run `postlens analyze` first. Using the generic prompt"
            );
            Ok(TrendSummary::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_post(post: &GeneratedPost) {
    println!("=== {} ===", post.post_id);
    println!(
        "suggested: {} at {:02}:00",
        post.suggested_posting_day, post.suggested_posting_hour
    );
    if let Some(text) = &post.post_text {
        println!("{text}");
    }
    if let Some(explanation) = &post.explanation {
        println!("why: {explanation}");
    }
    if let Some(error) = &post.error {
        println!("error: {error}");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_trends_fall_back_to_empty_summary() {
        let dir = tempfile::tempdir().unwrap();
        let trends = load_trends_or_default(&dir.path().join("trends.csv")).unwrap();
        assert!(trends.is_empty());
    }

    #[test]
    fn malformed_trends_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.csv");
        std::fs::write(&path, "metric,value\nnot_a_metric,{}\n").unwrap();
        assert!(load_trends_or_default(&path).is_err());
    }
}
