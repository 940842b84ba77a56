//! Analysis pipeline orchestration.

use chrono::NaiveDateTime;
use postlens_core::{EnrichedPost, RawPost, TrendSummary};

use crate::classifier::SentimentClassifier;
use crate::cluster::KMeans;
use crate::embeddings::{embed_posts, Embedder};
use crate::error::AnalyticsError;
use crate::features::{has_cta, score_sentiment, text_length};
use crate::normalize::{normalize_posts, NormalizeReport};
use crate::topics::cluster_labels;
use crate::trends::aggregate_trends;
use crate::types::AnalysisSettings;

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub posts: Vec<EnrichedPost>,
    pub trends: TrendSummary,
    pub report: NormalizeReport,
}

/// Run the full analysis over raw rows.
///
/// 1. Normalize: dedup on `(profile, text, date)`, parse dates relative to
///    `now`, hashtags and counts.
/// 2. Score sentiment one post at a time; blank texts skip the model.
/// 3. Flag call-to-action phrases and measure length.
/// 4. Embed every text and cluster all embeddings in one batch.
/// 5. Label clusters by their most frequent keywords.
/// 6. Aggregate the trend summary.
///
/// An empty input produces no posts and an empty summary.
///
/// # Errors
///
/// Model and clustering failures abort the whole run with
/// [`AnalyticsError`]; per-field parse problems never do.
pub async fn run_analysis<E, C>(
    raw: Vec<RawPost>,
    embedder: &E,
    classifier: &C,
    settings: &AnalysisSettings,
    now: NaiveDateTime,
) -> Result<AnalysisOutput, AnalyticsError>
where
    E: Embedder,
    C: SentimentClassifier,
{
    let (posts, report) = normalize_posts(raw, now);
    if posts.is_empty() {
        tracing::warn!("no posts to analyze");
        return Ok(AnalysisOutput {
            posts: Vec::new(),
            trends: TrendSummary::default(),
            report,
        });
    }

    tracing::info!(posts = posts.len(), "scoring sentiment");
    let mut sentiments = Vec::with_capacity(posts.len());
    for post in &posts {
        sentiments.push(score_sentiment(classifier, &post.text).await?);
    }

    let texts: Vec<&str> = posts.iter().map(|p| p.text.as_str()).collect();
    let embeddings = embed_posts(embedder, &texts, settings.embedding_dim).await?;

    tracing::info!(clusters = settings.cluster_count, "clustering posts");
    let assignments =
        KMeans::new(settings.cluster_count, settings.cluster_seed).fit_predict(&embeddings)?;
    let labels = cluster_labels(&texts, &assignments, settings.cluster_count);

    let enriched: Vec<EnrichedPost> = posts
        .into_iter()
        .zip(sentiments)
        .zip(assignments)
        .map(|((post, (sentiment, tone)), cluster)| {
            let total_engagement = post.total_engagement();
            EnrichedPost {
                length: text_length(&post.text),
                num_hashtags: post.hashtags.len(),
                has_cta: has_cta(&post.text),
                date_kind: post.time.kind,
                post_hour: post.time.hour,
                post_day: post.time.day,
                sentiment,
                tone,
                topic_cluster: cluster,
                topic_label: labels.get(cluster).cloned().unwrap_or_default(),
                total_engagement,
                profile: post.profile,
                text: post.text,
                hashtags: post.hashtags,
                date: post.date,
                likes: post.likes,
                comments: post.comments,
                shares: post.shares,
            }
        })
        .collect();

    let trends = aggregate_trends(&enriched, &settings.trends);

    Ok(AnalysisOutput {
        posts: enriched,
        trends,
        report,
    })
}
