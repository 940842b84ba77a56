//! `analyze` and `trends`: run the analytics pipeline and inspect its output.

use std::path::{Path, PathBuf};

use chrono::Local;
use postlens_analytics::{
    normalize_posts, run_analysis, AnalysisSettings, NormalizeReport, TeiClassifier, TeiEmbedder,
};
use postlens_core::storage::{read_raw_posts, read_trends, write_enriched_posts, write_trends};
use postlens_core::{AppConfig, TrendSummary};

/// Resolved input and output locations for one `analyze` run.
#[derive(Debug, Clone)]
pub(crate) struct AnalyzePaths {
    pub input: PathBuf,
    pub posts_output: PathBuf,
    pub trends_output: PathBuf,
}

/// Enrich the raw posts table and write the enriched table and trend summary.
///
/// With `dry_run`, only normalization runs and its report is printed; the
/// model servers are never contacted and nothing is written.
///
/// # Errors
///
/// Returns an error if the input is missing or malformed, a model call or
/// clustering fails, or an output file cannot be written.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    paths: &AnalyzePaths,
    dry_run: bool,
) -> anyhow::Result<()> {
    let raw = read_raw_posts(&paths.input)?;
    let now = Local::now().naive_local();

    if dry_run {
        let (posts, report) = normalize_posts(raw, now);
        println!(
            "dry-run: would analyze {} posts from {}",
            posts.len(),
            paths.input.display()
        );
        print_report(&report);
        return Ok(());
    }

    let embedder = TeiEmbedder::new(&config.tei_embed_url, config.request_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build embedding client: {e}"))?;
    let classifier = TeiClassifier::new(&config.tei_sentiment_url, config.request_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build sentiment client: {e}"))?;
    let settings = AnalysisSettings::from_app_config(config);

    let output = run_analysis(raw, &embedder, &classifier, &settings, now).await?;
    print_report(&output.report);

    if output.posts.is_empty() {
        println!("no posts to analyze; nothing written");
        return Ok(());
    }

    write_enriched_posts(&paths.posts_output, &output.posts)?;
    write_trends(&paths.trends_output, &output.trends)?;
    println!(
        "analyzed {} posts into {} and {}",
        output.posts.len(),
        paths.posts_output.display(),
        paths.trends_output.display()
    );
    println!("key trends:");
    print_trends(&output.trends)?;
    Ok(())
}

/// Print every metric of a saved trend summary, one per line.
///
/// # Errors
///
/// Returns an error if the file is missing or holds an unknown or malformed
/// metric.
pub(crate) fn run_trends(input: &Path) -> anyhow::Result<()> {
    let summary = read_trends(input)?;
    if summary.is_empty() {
        println!("trend summary at {} is empty", input.display());
        return Ok(());
    }
    print_trends(&summary)
}

fn print_trends(summary: &TrendSummary) -> anyhow::Result<()> {
    for (metric, table) in summary.entries() {
        let json = table.to_json()?;
        tracing::info!(metric = %metric, value = %json, "trend");
        println!("{metric}: {json}");
    }
    Ok(())
}

fn print_report(report: &NormalizeReport) {
    println!(
        "rows: {}, duplicates dropped: {}, relative dates: {}, unparsed dates: {}, \
         malformed hashtag lists: {}, defaulted counts: {}",
        report.rows_in,
        report.duplicates_dropped,
        report.relative_dates,
        report.unparsed_dates,
        report.malformed_hashtags,
        report.defaulted_counts
    );
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use postlens_core::TagCount;

    use super::*;

    #[test]
    fn run_trends_prints_saved_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trends.csv");
        let summary = TrendSummary {
            avg_engagement_by_day: BTreeMap::from([("Monday".to_string(), 12.5)]),
            ..TrendSummary::default()
        };
        write_trends(&path, &summary).unwrap();
        assert!(run_trends(&path).is_ok());
    }

    #[test]
    fn fresh_summary_prints_every_metric() {
        let summary = TrendSummary {
            avg_engagement_by_hour: BTreeMap::from([(9, 4.5), (17, 12.0)]),
            top_hashtags: vec![TagCount {
                tag: "#AI".to_string(),
                count: 3,
            }],
            ..TrendSummary::default()
        };
        assert!(print_trends(&summary).is_ok());
    }

    #[test]
    fn run_trends_requires_the_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_trends(&dir.path().join("trends.csv")).is_err());
    }
}
