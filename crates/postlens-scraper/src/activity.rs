//! Post extraction from a profile's "recent activity" page.

use postlens_core::RawPost;
use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;
use crate::parse::{clean_number, element_text, extract_hashtags, first_token};

const POST_SELECTOR: &str = "div.feed-shared-update-v2";
const TEXT_SELECTOR: &str = "span.break-words";
const DATE_SELECTOR: &str = "span.update-components-actor__sub-description";
const LIKES_SELECTOR: &str = "span.social-details-social-counts__reactions-count";
const COMMENTS_SELECTOR: &str = "li.social-details-social-counts__comments";
const SHARES_SELECTOR: &str = "li.social-details-social-counts__shares";

/// Compiled selectors for one activity page.
struct PostSelectors {
    post: Selector,
    text: Selector,
    date: Selector,
    likes: Selector,
    comments: Selector,
    shares: Selector,
}

impl PostSelectors {
    fn new() -> Result<Self, ScraperError> {
        Ok(Self {
            post: selector(POST_SELECTOR)?,
            text: selector(TEXT_SELECTOR)?,
            date: selector(DATE_SELECTOR)?,
            likes: selector(LIKES_SELECTOR)?,
            comments: selector(COMMENTS_SELECTOR)?,
            shares: selector(SHARES_SELECTOR)?,
        })
    }
}

fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// URL of the activity feed for `profile_url`.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidProfileUrl`] unless `profile_url` is an
/// `http(s)` URL.
pub fn activity_url(profile_url: &str) -> Result<String, ScraperError> {
    let trimmed = profile_url.trim();
    if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
        return Err(ScraperError::InvalidProfileUrl {
            url: profile_url.to_string(),
            reason: "must start with http:// or https://".to_string(),
        });
    }
    Ok(format!(
        "{}/recent-activity/all/",
        trimmed.trim_end_matches('/')
    ))
}

/// Extract one raw record per post container in `html`.
///
/// Missing elements degrade to an empty text/date or a zero count. The
/// hashtag cell is a JSON array of the `#tag` tokens found in the text.
///
/// # Errors
///
/// Returns [`ScraperError::Selector`] if a built-in selector fails to
/// compile, or [`ScraperError::Hashtags`] if a hashtag list cannot be
/// serialized.
pub fn extract_posts(html: &str, profile_url: &str) -> Result<Vec<RawPost>, ScraperError> {
    let selectors = PostSelectors::new()?;
    let document = Html::parse_document(html);

    let mut posts = Vec::new();
    for (idx, container) in document.select(&selectors.post).enumerate() {
        let post = extract_post(container, &selectors, profile_url)?;
        tracing::debug!(
            post = idx + 1,
            preview = %preview(post.text.as_deref().unwrap_or_default()),
            "extracted post"
        );
        posts.push(post);
    }

    tracing::info!(profile = profile_url, posts = posts.len(), "extracted posts");
    Ok(posts)
}

fn extract_post(
    container: ElementRef<'_>,
    selectors: &PostSelectors,
    profile_url: &str,
) -> Result<RawPost, ScraperError> {
    let find = |sel: &Selector| container.select(sel).next().map(element_text);

    let text = find(&selectors.text).unwrap_or_default();
    let date = find(&selectors.date).unwrap_or_default();
    let likes = find(&selectors.likes).map_or(0, |t| clean_number(&t));
    let comments = find(&selectors.comments).map_or(0, |t| clean_number(first_token(&t)));
    let shares = find(&selectors.shares).map_or(0, |t| clean_number(first_token(&t)));
    let hashtags = serde_json::to_string(&extract_hashtags(&text))?;

    Ok(RawPost {
        profile: Some(profile_url.to_string()),
        text: Some(text),
        hashtags: Some(hashtags),
        date: Some(date),
        likes: Some(likes.to_string()),
        comments: Some(comments.to_string()),
        shares: Some(shares.to_string()),
    })
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}
