//! End-to-end analysis runs with in-process model fakes.

use chrono::{NaiveDate, NaiveDateTime};
use postlens_analytics::{
    run_analysis, AnalysisSettings, AnalyticsError, Embedder, Prediction, SentimentClassifier,
    TrendOptions,
};
use postlens_core::storage::{read_enriched_posts, read_trends, write_enriched_posts, write_trends};
use postlens_core::{DateKind, RawPost, Tone};

/// Two-dimensional embedding: byte length and word count.
struct LengthEmbedder;

impl Embedder for LengthEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        #[allow(clippy::cast_precision_loss)]
        let vectors = texts
            .iter()
            .map(|t| vec![t.len() as f32, t.split_whitespace().count() as f32])
            .collect();
        Ok(vectors)
    }
}

/// Positive for anything mentioning "great", negative for "terrible".
struct KeywordClassifier;

impl SentimentClassifier for KeywordClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction, AnalyticsError> {
        let lower = text.to_lowercase();
        let (label, score) = if lower.contains("great") {
            ("POSITIVE", 0.9)
        } else if lower.contains("terrible") {
            ("NEGATIVE", 0.8)
        } else {
            ("POSITIVE", 0.2)
        };
        Ok(Prediction {
            label: label.to_string(),
            score,
        })
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, AnalyticsError> {
        Err(AnalyticsError::Tei("model offline".to_string()))
    }
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 15)
        .unwrap()
        .and_hms_opt(16, 45, 0)
        .unwrap()
}

fn raw(profile: &str, text: &str, date: &str, likes: &str, comments: &str, shares: &str) -> RawPost {
    RawPost {
        profile: Some(profile.to_string()),
        text: Some(text.to_string()),
        hashtags: Some("['#Rust', '#AIHashtag']".to_string()),
        date: Some(date.to_string()),
        likes: Some(likes.to_string()),
        comments: Some(comments.to_string()),
        shares: Some(shares.to_string()),
    }
}

fn ten_posts() -> Vec<RawPost> {
    vec![
        raw("alice", "A great week shipping the parser", "2024-03-05 09:00:00", "10", "2", "0"),
        raw("alice", "Hiring two engineers, DM me", "2024-03-06 10:00:00", "20", "4", "1"),
        raw("alice", "A great week shipping the parser", "2024-03-05 09:00:00", "999", "0", "0"),
        raw("bob", "Terrible outage postmortem", "2024-03-07 15:00:00", "3", "0", "0"),
        raw("bob", "Check out our new release notes", "3d ago", "7", "1", ""),
        raw("bob", "Quarterly numbers are in", "not a date", "5", "5", "5"),
        raw("carol", "Join us at the meetup on Friday", "2024-03-08 18:30:00", "40", "10", "2"),
        raw("carol", "Reflections on a great year of open source", "2024-03-09 08:15:00", "60", "6", "4"),
        raw("dave", "Short note", "2024-03-10 12:00:00", "1", "0", "0"),
        raw("dave", "Another short note about compilers", "1w ago", "2.0", "-1", "n/a"),
    ]
}

fn settings() -> AnalysisSettings {
    AnalysisSettings {
        embedding_dim: 2,
        cluster_count: 3,
        cluster_seed: 42,
        trends: TrendOptions {
            focus_profile: Some("carol".to_string()),
            include_relative_dates: true,
        },
    }
}

#[tokio::test]
async fn ten_posts_with_one_duplicate() {
    let output = run_analysis(ten_posts(), &LengthEmbedder, &KeywordClassifier, &settings(), now())
        .await
        .expect("analysis should succeed");

    assert_eq!(output.report.rows_in, 10);
    assert_eq!(output.report.duplicates_dropped, 1);
    assert_eq!(output.posts.len(), 9);

    // alice: (12 + 25) / 2, bob: (3 + 8 + 15) / 3, carol: (52 + 70) / 2,
    // dave: (1 + 2) / 2.
    let by_profile = &output.trends.avg_engagement_by_profile;
    assert_eq!(by_profile.len(), 4);
    assert_eq!(by_profile["alice"], 18.5);
    assert_eq!(by_profile["bob"], 8.67);
    assert_eq!(by_profile["carol"], 61.0);
    assert_eq!(by_profile["dave"], 1.5);

    // The first of the duplicated rows survives.
    assert_eq!(output.posts[0].likes, 10);
}

#[tokio::test]
async fn per_post_features() {
    let output = run_analysis(ten_posts(), &LengthEmbedder, &KeywordClassifier, &settings(), now())
        .await
        .unwrap();
    let posts = &output.posts;

    assert_eq!(posts[0].tone, Tone::Positive);
    assert_eq!(posts[0].hashtags, vec!["#Rust", "#AI"]);
    assert_eq!(posts[0].num_hashtags, 2);
    assert_eq!(posts[0].post_hour, Some(9));
    assert_eq!(posts[0].post_day.as_deref(), Some("Tuesday"));
    assert_eq!(posts[0].length, "A great week shipping the parser".len());

    assert!(posts[1].has_cta);
    assert_eq!(posts[2].tone, Tone::Negative);
    assert!(posts[3].has_cta);
    assert_eq!(posts[3].date_kind, DateKind::Relative);
    assert_eq!(posts[4].date_kind, DateKind::Unparsed);
    assert_eq!(posts[4].post_hour, None);
    assert_eq!(posts[7].tone, Tone::Neutral);

    // "2.0" truncates, "-1" clamps, "n/a" defaults.
    assert_eq!(posts[8].total_engagement, 2);

    assert!(posts.iter().all(|p| p.topic_cluster < 3));
    assert!(posts.iter().all(|p| !p.topic_label.is_empty()));
}

#[tokio::test]
async fn focus_profile_tables() {
    let output = run_analysis(ten_posts(), &LengthEmbedder, &KeywordClassifier, &settings(), now())
        .await
        .unwrap();

    let focus_tags = &output.trends.focus_top_hashtags;
    assert_eq!(focus_tags.len(), 2);
    assert_eq!(focus_tags[0].tag, "#Rust");
    assert_eq!(focus_tags[0].count, 2);

    let carol_engagement: u64 = output
        .posts
        .iter()
        .filter(|p| p.profile == "carol")
        .map(|p| p.total_engagement)
        .sum();
    assert_eq!(carol_engagement, 122);
    assert!(!output.trends.focus_top_topics.is_empty());
}

#[tokio::test]
async fn outputs_survive_a_storage_round_trip() {
    let output = run_analysis(ten_posts(), &LengthEmbedder, &KeywordClassifier, &settings(), now())
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let posts_path = dir.path().join("posts_analyzed.csv");
    let trends_path = dir.path().join("trends.csv");

    write_enriched_posts(&posts_path, &output.posts).unwrap();
    write_trends(&trends_path, &output.trends).unwrap();

    assert_eq!(read_enriched_posts(&posts_path).unwrap(), output.posts);
    assert_eq!(read_trends(&trends_path).unwrap(), output.trends);
}

#[tokio::test]
async fn empty_input_yields_empty_output() {
    let output = run_analysis(Vec::new(), &FailingEmbedder, &KeywordClassifier, &settings(), now())
        .await
        .unwrap();
    assert!(output.posts.is_empty());
    assert!(output.trends.is_empty());
}

#[tokio::test]
async fn embedding_failure_aborts_the_run() {
    let err = run_analysis(ten_posts(), &FailingEmbedder, &KeywordClassifier, &settings(), now())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::Tei(_)));
}

#[tokio::test]
async fn fewer_posts_than_clusters_is_a_clustering_error() {
    let rows = ten_posts().into_iter().take(2).collect();
    let err = run_analysis(rows, &LengthEmbedder, &KeywordClassifier, &settings(), now())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::Clustering(_)));
}
