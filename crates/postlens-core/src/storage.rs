//! CSV persistence for raw posts, enriched posts and the trend summary.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::StorageError;
use crate::post::{EnrichedPost, RawPost};
use crate::trends::{Metric, TrendSummary};

/// One row of `trends.csv`.
#[derive(Debug, Serialize, Deserialize)]
struct TrendRow {
    metric: String,
    value: String,
}

/// Load the raw ingestion table.
///
/// # Errors
///
/// Returns [`StorageError::MissingInput`] if `path` does not exist, or a CSV
/// error for malformed rows.
pub fn read_raw_posts(path: &Path) -> Result<Vec<RawPost>, StorageError> {
    let posts: Vec<RawPost> = read_rows(path)?;
    tracing::info!(path = %path.display(), posts = posts.len(), "loaded raw posts");
    Ok(posts)
}

/// Write raw post records in the ingestion format.
///
/// # Errors
///
/// Returns an I/O or CSV error if the file cannot be written.
pub fn write_raw_posts(path: &Path, posts: &[RawPost]) -> Result<(), StorageError> {
    write_rows(path, posts)?;
    tracing::info!(path = %path.display(), posts = posts.len(), "saved raw posts");
    Ok(())
}

/// # Errors
///
/// Returns an I/O or CSV error if the file cannot be written.
pub fn write_enriched_posts(path: &Path, posts: &[EnrichedPost]) -> Result<(), StorageError> {
    write_rows(path, posts)?;
    tracing::info!(path = %path.display(), posts = posts.len(), "saved enriched posts");
    Ok(())
}

/// # Errors
///
/// Returns [`StorageError::MissingInput`] if `path` does not exist, or a CSV
/// error for rows that do not match the enriched schema.
pub fn read_enriched_posts(path: &Path) -> Result<Vec<EnrichedPost>, StorageError> {
    read_rows(path)
}

/// Write the trend summary as `(metric, value)` rows, one per metric.
///
/// # Errors
///
/// Returns an I/O or CSV error if the file cannot be written.
pub fn write_trends(path: &Path, trends: &TrendSummary) -> Result<(), StorageError> {
    let rows = trends
        .entries()
        .into_iter()
        .map(|(metric, table)| {
            let value = table.to_json().map_err(|source| StorageError::InvalidMetric {
                metric: metric.name().to_string(),
                source,
            })?;
            Ok(TrendRow {
                metric: metric.name().to_string(),
                value,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;
    write_rows(path, &rows)?;
    tracing::info!(path = %path.display(), "saved trends");
    Ok(())
}

/// Load a trend summary written by [`write_trends`].
///
/// Metrics absent from the file stay empty.
///
/// # Errors
///
/// Returns [`StorageError::MissingInput`] if `path` does not exist,
/// [`StorageError::UnknownMetric`] for unrecognised metric names and
/// [`StorageError::InvalidMetric`] for values that do not fit the metric.
pub fn read_trends(path: &Path) -> Result<TrendSummary, StorageError> {
    let rows: Vec<TrendRow> = read_rows(path)?;
    let mut summary = TrendSummary::default();
    for row in rows {
        let metric: Metric = row.metric.parse()?;
        let table = metric.decode(&row.value)?;
        if !summary.set(metric, table) {
            tracing::warn!(metric = %metric, "decoded table does not belong to metric; ignored");
        }
    }
    tracing::info!(path = %path.display(), "loaded trends");
    Ok(summary)
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        return Err(StorageError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path).map_err(|source| csv_error(path, source))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| csv_error(path, source))
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), StorageError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path).map_err(|source| csv_error(path, source))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|source| csv_error(path, source))?;
    }
    writer.flush().map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Create the parent directory of `path` if it is missing.
///
/// # Errors
///
/// Returns [`StorageError::Io`] if the directory cannot be created.
pub fn ensure_parent(path: &Path) -> Result<(), StorageError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            std::fs::create_dir_all(dir).map_err(|source| StorageError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StorageError {
    StorageError::Csv {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
