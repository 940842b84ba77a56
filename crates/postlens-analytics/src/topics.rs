//! Keyword labels for topic clusters.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Number of keywords in a topic label.
pub const LABEL_WORDS: usize = 5;

/// NLTK's English stopword list.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Contraction suffixes split off a word, as in "don't" -> "do" + "n't".
const CLITICS: &[&str] = &["'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Lower-cased word tokens of `text` that are purely alphanumeric and not
/// stopwords.
///
/// Tokens are whitespace-separated words with surrounding punctuation peeled
/// off. A token that still holds punctuation (`ai-driven`, `v3.5`, the tail of
/// a URL) is dropped whole rather than split into fragments.
pub fn keywords(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .flat_map(split_separators)
        .map(peel)
        .filter(|token| !token.is_empty() && token.chars().all(char::is_alphanumeric))
        .map(str::to_lowercase)
        .filter(|token| !STOPWORD_SET.contains(token.as_str()))
}

/// Split a word after every `:` or `,` that is not followed by a digit, so
/// `growth,` and `https://x.com` break apart while `10:30` and `1,000` stay
/// whole.
fn split_separators(word: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = word.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == ':' || c == ',' {
            let before_digit = chars.peek().is_some_and(|&(_, next)| next.is_ascii_digit());
            if !before_digit {
                pieces.push(&word[start..i]);
                start = i + c.len_utf8();
            }
        }
    }
    pieces.push(&word[start..]);
    pieces
}

/// Strip leading and trailing ASCII punctuation and a trailing contraction.
fn peel(token: &str) -> &str {
    let token = token.trim_matches(|c: char| c.is_ascii_punctuation());
    let lower = token.to_ascii_lowercase();
    if lower.ends_with("n't") {
        return &token[..token.len() - 3];
    }
    for clitic in CLITICS {
        if lower.ends_with(clitic) {
            return &token[..token.len() - clitic.len()];
        }
    }
    token
}

/// Label built from the [`LABEL_WORDS`] most frequent keywords across
/// `texts`, joined by `", "`. Ties keep first-seen order.
#[must_use]
pub fn topic_label<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for word in texts.into_iter().flat_map(keywords) {
        let count = counts.entry(word.clone()).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort: equal counts stay in first-seen order.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.truncate(LABEL_WORDS);
    order.join(", ")
}

/// One label per cluster id in `0..k`, computed over the texts assigned to
/// that cluster. Clusters without members get an empty label.
#[must_use]
pub fn cluster_labels(texts: &[&str], assignments: &[usize], k: usize) -> Vec<String> {
    (0..k)
        .map(|cluster| {
            topic_label(
                texts
                    .iter()
                    .zip(assignments)
                    .filter(|&(_, &id)| id == cluster)
                    .map(|(text, _)| *text),
            )
        })
        .collect()
}
