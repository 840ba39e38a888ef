// Feed fetching, rendering and page rewriting behind the newsboard and preview_feed
// binaries; the integration tests drive these modules directly.

pub mod error;
pub mod ingestion;
pub mod page;
pub mod refresh;
pub mod render;
