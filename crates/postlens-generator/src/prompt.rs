//! Prompt construction from the trend summary and reviewer feedback.

use std::fmt::Write as _;

use postlens_core::{CtaPresence, Tone, TrendSummary};

use crate::feedback::Feedback;

const DEFAULT_TOPICS: &str = "AI, marketing, performance";
const DEFAULT_HASHTAGS: &str = "#PerformanceMarketing, #AI, #Marketing";
const DEFAULT_FOCUS_TOPIC: &str = "AI in Marketing";
const EXPLICIT_CTA: &str = "explicit CTA (e.g., 'DM me for details')";
const SUBTLE_CTA: &str = "subtle CTA (e.g., 'Comment your thoughts below')";

/// Day suggested when the summary has no weekday table.
pub const DEFAULT_POSTING_DAY: &str = "Tuesday";
/// Hour suggested when the summary has no hour table.
pub const DEFAULT_POSTING_HOUR: u8 = 15;

/// A generation prompt and the weekdays it was tuned for.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub text: String,
    /// Up to two weekdays, best first. Empty for the fallback prompt.
    pub best_days: Vec<String>,
}

impl Prompt {
    /// Best weekday, or [`DEFAULT_POSTING_DAY`].
    #[must_use]
    pub fn suggested_day(&self) -> &str {
        self.best_days
            .first()
            .map_or(DEFAULT_POSTING_DAY, String::as_str)
    }
}

/// Build the user prompt for one post.
///
/// An empty summary gives a generic prompt. Otherwise the prompt names the
/// focus profile's topics and hashtags, the better-performing tone and CTA
/// style, and every piece of stored feedback.
#[must_use]
pub fn build_prompt(trends: &TrendSummary, feedback: &Feedback, author: &str) -> Prompt {
    if trends.is_empty() {
        tracing::warn!("trend summary is empty, using the generic prompt");
        return Prompt {
            text: fallback_prompt(author),
            best_days: Vec::new(),
        };
    }

    let best_days = best_days(trends);
    let tone = preferred_tone(trends);
    let cta = preferred_cta(trends);

    let topics: Vec<&str> = trends.focus_top_topics.keys().map(String::as_str).collect();
    let topics_str = if topics.is_empty() {
        DEFAULT_TOPICS.to_string()
    } else {
        topics.join(", ")
    };
    let hashtags: Vec<&str> = trends
        .focus_top_hashtags
        .iter()
        .map(|t| t.tag.as_str())
        .collect();
    let hashtags_str = if hashtags.is_empty() {
        DEFAULT_HASHTAGS.to_string()
    } else {
        hashtags.join(", ")
    };
    let focus_topic = topics.first().copied().unwrap_or(DEFAULT_FOCUS_TOPIC);

    let mut text = format!(
        "You are a professional LinkedIn content creator writing for {author}.\n\
         Use the engagement analysis and any reviewer feedback below to write a post in \
         their voice: professional, actionable and specific.\n\
         \n\
         Key insights from the analysis:\n\
         - High-engagement topics: {topics_str}.\n\
         - A {tone} tone performs best.\n\
         - Engagement favours a {cta}.\n\
         - Posts of 500-1000 characters tend to get more engagement.\n\
         - Popular hashtags: {hashtags_str}.\n"
    );

    let feedback_lines = feedback_lines(feedback);
    if !feedback_lines.is_empty() {
        text.push_str("\nIncorporate this feedback from earlier drafts:\n");
        text.push_str(&feedback_lines);
    }

    text.push_str(&format!(
        "\nWrite ONE LinkedIn post based on the analysis and feedback.\n\
         \n\
         Respond with a JSON object ONLY, with exactly two keys:\n\
         1. `post_text`: the complete post, hashtags included.\n\
         2. `explanation`: the choices you made, e.g. \"Focused on {focus_topic} with a \
         {tone} tone and a {cta}.\"\n\
         \n\
         Example:\n\
         {{\"post_text\": \"...\", \"explanation\": \"...\"}}\n\
         \n\
         Do not include any text before or after the JSON object.\n"
    ));

    Prompt { text, best_days }
}

fn fallback_prompt(author: &str) -> String {
    format!(
        "You are a professional LinkedIn content creator writing for {author}.\n\
         Write a compelling LinkedIn post about AI in marketing or performance marketing.\n\
         Use a professional and engaging tone. Include a subtle CTA. Keep it 500-1000 characters.\n\
         Include relevant hashtags like #AI #Marketing #PerformanceMarketing.\n\
         \n\
         Respond with a JSON object ONLY, with keys `post_text` and `explanation`.\n\
         Example: {{\"post_text\": \"...\", \"explanation\": \"Generic post, no trend data available.\"}}\n"
    )
}

/// The two weekdays with the highest mean engagement, best first.
fn best_days(trends: &TrendSummary) -> Vec<String> {
    let mut days: Vec<(&String, f64)> = trends
        .avg_engagement_by_day
        .iter()
        .map(|(day, avg)| (day, *avg))
        .collect();
    days.sort_by(|a, b| b.1.total_cmp(&a.1));
    days.into_iter().take(2).map(|(day, _)| day.clone()).collect()
}

/// `positive` unless negative posts average strictly more engagement.
fn preferred_tone(trends: &TrendSummary) -> Tone {
    let avg = |tone| trends.avg_engagement_by_tone.get(&tone).copied().unwrap_or(0.0);
    if avg(Tone::Positive) >= avg(Tone::Negative) {
        Tone::Positive
    } else {
        Tone::Negative
    }
}

fn preferred_cta(trends: &TrendSummary) -> &'static str {
    let avg = |key| {
        trends
            .avg_engagement_by_has_cta
            .get(&key)
            .copied()
            .unwrap_or(0.0)
    };
    if avg(CtaPresence::With) > avg(CtaPresence::Without) {
        EXPLICIT_CTA
    } else {
        SUBTLE_CTA
    }
}

fn feedback_lines(feedback: &Feedback) -> String {
    let mut out = String::new();
    for (post_id, fields) in feedback {
        if fields.is_empty() {
            continue;
        }
        let details = fields
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ");
        let short_id: String = post_id.chars().take(10).collect();
        let _ = writeln!(out, "- For posts similar to '{short_id}...': {details}");
    }
    out
}

/// Hour with the highest mean engagement (earliest on ties), or
/// [`DEFAULT_POSTING_HOUR`].
#[must_use]
pub fn suggested_hour(trends: &TrendSummary) -> u8 {
    let mut best: Option<(u8, f64)> = None;
    for (&hour, &avg) in &trends.avg_engagement_by_hour {
        if best.is_none_or(|(_, top)| avg > top) {
            best = Some((hour, avg));
        }
    }
    best.map_or(DEFAULT_POSTING_HOUR, |(hour, _)| hour)
}
