//! Extraction of raw post records from saved profile activity pages.
//!
//! Pages are parsed offline from their HTML source; fetching and scrolling
//! them is left to whatever produced the file.

pub mod activity;
pub mod error;
pub mod parse;

pub use activity::{activity_url, extract_posts};
pub use error::ScraperError;
pub use parse::{clean_number, extract_hashtags};
