use chrono::{DateTime, Local};
use common::PageConfig;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::UpdateError;
use crate::render::{news_fragment, NEWS_UNAVAILABLE};

/// Format of the update timestamp, before the locale suffix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What a successful page rewrite did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUpdate {
    pub items: usize,
    pub timestamp: String,
    pub news_replaced: bool,
    pub timestamp_replaced: bool,
}

/// `YYYY-MM-DD HH:MM:SS` followed by `suffix`.
pub fn format_timestamp(now: DateTime<Local>, suffix: &str) -> String {
    format!("{}{}", now.format(TIMESTAMP_FORMAT), suffix)
}

/// Replaces the news container in `html` with one holding `fragment`.
///
/// The empty `marker` (e.g. `<div id="news"></div>`) is matched first. Failing that, a
/// container this tool filled on an earlier run is replaced so repeated runs do not
/// pile up: the marker's opening tag followed directly by the fallback message or by
/// an `<ol>` list, then the closing tag. Any other container content is left alone.
/// Only the first container is touched. Returns `None` if there is none.
pub fn replace_news(html: &str, marker: &str, fragment: &str) -> Option<String> {
    let (open, close) = split_container(marker)?;
    let (start, end) = match html.find(marker) {
        Some(start) => (start, start + marker.len()),
        None => filled_container(html, open, close)?,
    };

    let mut out = String::with_capacity(html.len() + fragment.len());
    out.push_str(&html[..start]);
    out.push_str(open);
    out.push_str(fragment);
    out.push_str(close);
    out.push_str(&html[end..]);
    Some(out)
}

/// Byte range of a container holding exactly what [`news_fragment`] produces.
fn filled_container(html: &str, open: &str, close: &str) -> Option<(usize, usize)> {
    let start = html.find(open)?;
    let inner = &html[start + open.len()..];

    let inner_len = if inner.starts_with(NEWS_UNAVAILABLE) {
        NEWS_UNAVAILABLE.len()
    } else if inner.starts_with("<ol>") {
        inner.find(&format!("</ol>{close}"))? + "</ol>".len()
    } else {
        return None;
    };

    if !inner[inner_len..].starts_with(close) {
        return None;
    }
    Some((start, start + open.len() + inner_len + close.len()))
}

/// Splits `<div id="news"></div>` into its opening and closing tags.
fn split_container(marker: &str) -> Option<(&str, &str)> {
    let split = marker.find("</")?;
    let (open, close) = marker.split_at(split);
    if open.is_empty() {
        return None;
    }
    Some((open, close))
}

/// Replaces the first occurrence of `marker` with `value`.
pub fn replace_first(html: &str, marker: &str, value: &str) -> Option<String> {
    if marker.is_empty() || !html.contains(marker) {
        return None;
    }
    Some(html.replacen(marker, value, 1))
}

/// Reads the page, injects the rendered items and a timestamp taken now, and writes
/// the page back.
pub async fn update_page(config: &PageConfig, items: &[String]) -> Result<PageUpdate, UpdateError> {
    let timestamp = format_timestamp(Local::now(), &config.timestamp_suffix);
    update_page_at(Path::new(&config.path), config, items, &timestamp).await
}

/// [`update_page`] with an explicit path and timestamp.
pub async fn update_page_at(
    path: &Path,
    config: &PageConfig,
    items: &[String],
    timestamp: &str,
) -> Result<PageUpdate, UpdateError> {
    let html = match tokio::fs::read_to_string(path).await {
        Ok(html) => html,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(UpdateError::NotFound(path.to_path_buf())),
        Err(e) => return Err(UpdateError::io("read", path, e)),
    };

    let fragment = news_fragment(items);

    let (html, news_replaced) = match replace_news(&html, &config.news_marker, &fragment) {
        Some(updated) => (updated, true),
        None => (html, false),
    };
    let (html, timestamp_replaced) = match replace_first(&html, &config.timestamp_marker, timestamp) {
        Some(updated) => (updated, true),
        None => (html, false),
    };
    debug!(path = %path.display(), news_replaced, timestamp_replaced, "page markers substituted");

    write_atomic(path, html.as_bytes()).await?;

    Ok(PageUpdate {
        items: items.len(),
        timestamp: timestamp.to_string(),
        news_replaced,
        timestamp_replaced,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Writes `data` next to `path` and renames it over `path`, so a failed write leaves
/// the old page intact.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), UpdateError> {
    let temp = temp_path(path);

    let written = async {
        let mut file = tokio::fs::File::create(&temp)
            .await
            .map_err(|e| UpdateError::io("create", &temp, e))?;
        file.write_all(data)
            .await
            .map_err(|e| UpdateError::io("write", &temp, e))?;
        file.sync_all()
            .await
            .map_err(|e| UpdateError::io("sync", &temp, e))?;
        tokio::fs::rename(&temp, path)
            .await
            .map_err(|e| UpdateError::io("replace", path, e))
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(&temp).await;
    }
    written
}
