use std::path::PathBuf;

/// Why a feed fetch produced no items.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("malformed feed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed feed XML: {0}")]
    MalformedFeed(&'static str),
}

/// Why the page could not be rewritten.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("page not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        UpdateError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
