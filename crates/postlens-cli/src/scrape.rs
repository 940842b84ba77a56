//! `scrape`: turn saved activity pages into the raw posts table.

use std::path::{Path, PathBuf};

use postlens_core::storage::write_raw_posts;
use postlens_scraper::{activity_url, extract_posts};

/// One `--page PROFILE_URL=HTML_FILE` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub profile_url: String,
    pub html_file: PathBuf,
}

/// Split on the last `=` so profile URLs with query strings survive.
pub(crate) fn parse_page_arg(arg: &str) -> Result<PageSource, String> {
    let (url, file) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PROFILE_URL=HTML_FILE, got \"{arg}\""))?;
    let url = url.trim();
    let file = file.trim();
    if url.is_empty() || file.is_empty() {
        return Err(format!("expected PROFILE_URL=HTML_FILE, got \"{arg}\""));
    }
    Ok(PageSource {
        profile_url: url.to_string(),
        html_file: PathBuf::from(file),
    })
}

/// Extract posts from every page and write them to `output`.
///
/// A page that cannot be read or parsed is logged and skipped. Nothing is
/// written when no posts were extracted.
///
/// # Errors
///
/// Returns an error if every page failed, or if the table cannot be written.
pub(crate) fn run_scrape(pages: &[PageSource], output: &Path) -> anyhow::Result<()> {
    let mut all_posts = Vec::new();
    let mut failed_pages = 0usize;

    for page in pages {
        match scrape_page(page) {
            Ok(posts) => {
                tracing::info!(
                    profile = %page.profile_url,
                    posts = posts.len(),
                    "extracted posts"
                );
                all_posts.extend(posts);
            }
            Err(e) => {
                failed_pages += 1;
                tracing::error!(
                    profile = %page.profile_url,
                    file = %page.html_file.display(),
                    error = %e,
                    "skipping page"
                );
            }
        }
    }

    if failed_pages == pages.len() {
        anyhow::bail!("all {failed_pages} pages failed to scrape");
    }
    if all_posts.is_empty() {
        println!("no posts extracted; nothing written");
        return Ok(());
    }

    write_raw_posts(output, &all_posts)?;
    println!(
        "scraped {} posts from {} pages ({failed_pages} failed) into {}",
        all_posts.len(),
        pages.len() - failed_pages,
        output.display()
    );
    Ok(())
}

fn scrape_page(page: &PageSource) -> anyhow::Result<Vec<postlens_core::RawPost>> {
    let url = activity_url(&page.profile_url)?;
    tracing::debug!(url = %url, file = %page.html_file.display(), "reading saved activity page");
    let html = std::fs::read_to_string(&page.html_file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", page.html_file.display()))?;
    Ok(extract_posts(&html, &page.profile_url)?)
}
