use common::Config;
use tracing::{error, info, warn};

use crate::error::{FetchError, UpdateError};
use crate::ingestion;
use crate::page::{self, PageUpdate};

/// Outcome of one refresh run. Failures are already logged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub items_fetched: usize,
    pub page: Option<PageUpdate>,
}

/// Fetches the feed at `feed_url` and rewrites the configured page.
///
/// Never fails: a fetch error degrades to the "unavailable" message on the page and a
/// page error skips the write. Both are logged here.
pub async fn run(config: &Config, feed_url: &str) -> RunReport {
    info!(url = feed_url, "fetching news feed");
    let items = match ingestion::fetch_rendered_items(feed_url, config.feed.max_items, config.feed.timeout_seconds).await {
        Ok(items) => items,
        Err(e) => {
            log_fetch_error(feed_url, &e);
            Vec::new()
        }
    };

    let page = match page::update_page(&config.page, &items).await {
        Ok(update) => {
            if !update.news_replaced {
                warn!(path = %config.page.path, "news container not found in page");
            }
            if !update.timestamp_replaced {
                warn!(path = %config.page.path, "timestamp marker not found in page");
            }
            info!(items = update.items, timestamp = %update.timestamp, "page updated");
            Some(update)
        }
        Err(e) => {
            log_update_error(&e);
            None
        }
    };

    RunReport {
        items_fetched: items.len(),
        page,
    }
}

fn log_fetch_error(url: &str, e: &FetchError) {
    match e {
        FetchError::Request(err) if err.is_timeout() => error!(url, %e, "feed request timed out"),
        FetchError::Request(_) => error!(url, %e, "feed request failed"),
        FetchError::HttpStatus(status) => error!(url, status, "feed returned an error status"),
        FetchError::Xml(_) | FetchError::MalformedFeed(_) => error!(url, %e, "feed XML could not be parsed"),
    }
}

fn log_update_error(e: &UpdateError) {
    match e {
        UpdateError::NotFound(path) => {
            error!(path = %path.display(), "page file not found; run from the directory that holds it")
        }
        UpdateError::Io { .. } => error!(%e, "failed to update page"),
    }
}
