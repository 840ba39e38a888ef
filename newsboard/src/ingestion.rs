use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::render::{FeedItem, RawItem};

/// The one feed this tool reads.
pub const FEED_URL: &str = "http://feeds.bbci.co.uk/news/rss.xml";

/// Builds the HTTP client used for the feed request. Default headers only.
pub fn build_client(timeout_secs: u64) -> Result<Client, FetchError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// GETs the feed and returns its body. Any non-2xx status is an error; there is no retry.
pub async fn fetch_feed_xml(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let body = response.text().await?;
    Ok(body)
}

/// Fetches the feed and returns the first `max_items` entries that carry both a title
/// and a link, in document order.
pub async fn fetch_feed_items(url: &str, max_items: usize, timeout_secs: u64) -> Result<Vec<FeedItem>, FetchError> {
    let client = build_client(timeout_secs)?;
    let xml = fetch_feed_xml(&client, url).await?;
    let raw = parse_feed_items(&xml, max_items)?;

    let total = raw.len();
    let items: Vec<FeedItem> = raw.into_iter().filter_map(FeedItem::from_raw).collect();
    debug!(url, selected = total, kept = items.len(), "parsed feed items");
    Ok(items)
}

/// Same as [`fetch_feed_items`], rendered to `<li>` strings.
pub async fn fetch_rendered_items(url: &str, max_items: usize, timeout_secs: u64) -> Result<Vec<String>, FetchError> {
    let items = fetch_feed_items(url, max_items, timeout_secs).await?;
    Ok(items.iter().map(FeedItem::to_html).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"description" => Some(Field::Description),
            _ => None,
        }
    }

    fn slot<'a>(&self, item: &'a mut RawItem) -> &'a mut Option<String> {
        match self {
            Field::Title => &mut item.title,
            Field::Link => &mut item.link,
            Field::Description => &mut item.description,
        }
    }
}

/// Text being collected for a direct child of an open `<item>`.
struct Capture {
    field: Field,
    depth: usize,
    text: String,
    // Set once a nested element starts; later text is not the element's own text.
    sealed: bool,
}

struct OpenItem {
    depth: usize,
    index: usize,
    raw: RawItem,
    capture: Option<Capture>,
}

/// Parses the whole document and returns the first `max_items` `<item>` elements found
/// anywhere in it, in document order.
///
/// Only direct `title`, `link` and `description` children are read, first match wins,
/// and only the text before a child's first nested element counts. The whole document
/// must be well-formed even if the items of interest come first.
pub fn parse_feed_items(xml: &str, max_items: usize) -> Result<Vec<RawItem>, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    reader.check_end_names(true);

    // Indexed by start order so nested items keep document order.
    let mut found: Vec<Option<RawItem>> = Vec::new();
    let mut open: Vec<OpenItem> = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                enter_element(depth, &mut seen_root)?;
                seal_captures(&mut open);
                if e.name().as_ref() == b"item" {
                    open.push(OpenItem {
                        depth,
                        index: found.len(),
                        raw: RawItem::default(),
                        capture: None,
                    });
                    found.push(None);
                } else if let Some((item, field)) = child_field(&mut open, &e, depth) {
                    item.capture = Some(Capture {
                        field,
                        depth,
                        text: String::new(),
                        sealed: false,
                    });
                }
                depth += 1;
            }
            Event::Empty(e) => {
                enter_element(depth, &mut seen_root)?;
                seal_captures(&mut open);
                if e.name().as_ref() == b"item" {
                    found.push(Some(RawItem::default()));
                } else if let Some((item, field)) = child_field(&mut open, &e, depth) {
                    *field.slot(&mut item.raw) = Some(String::new());
                }
            }
            Event::End(e) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(FetchError::MalformedFeed("unexpected closing tag"))?;

                if let Some(item) = open.last_mut() {
                    if item.capture.as_ref().is_some_and(|c| c.depth == depth) {
                        if let Some(capture) = item.capture.take() {
                            *capture.field.slot(&mut item.raw) = Some(capture.text);
                        }
                    }
                }

                if e.name().as_ref() == b"item" && open.last().is_some_and(|item| item.depth == depth) {
                    if let Some(item) = open.pop() {
                        found[item.index] = Some(item.raw);
                    }
                }
            }
            Event::Text(e) => {
                if depth == 0 {
                    if e.iter().any(|b| !b.is_ascii_whitespace()) {
                        return Err(FetchError::MalformedFeed("text outside the root element"));
                    }
                    continue;
                }
                if let Some(capture) = open_capture(&mut open) {
                    capture.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if depth == 0 {
                    return Err(FetchError::MalformedFeed("CDATA outside the root element"));
                }
                if let Some(capture) = open_capture(&mut open) {
                    capture.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(FetchError::MalformedFeed("no root element"));
    }
    if depth != 0 {
        return Err(FetchError::MalformedFeed("unclosed element at end of document"));
    }

    Ok(found.into_iter().take(max_items).flatten().collect())
}

fn enter_element(depth: usize, seen_root: &mut bool) -> Result<(), FetchError> {
    if depth == 0 {
        if *seen_root {
            return Err(FetchError::MalformedFeed("more than one root element"));
        }
        *seen_root = true;
    }
    Ok(())
}

fn seal_captures(open: &mut [OpenItem]) {
    for capture in open.iter_mut().filter_map(|item| item.capture.as_mut()) {
        capture.sealed = true;
    }
}

/// The innermost item and the field `e` fills, if `e` is a direct child of that item
/// whose field has not been seen yet.
fn child_field<'a>(open: &'a mut [OpenItem], e: &BytesStart<'_>, depth: usize) -> Option<(&'a mut OpenItem, Field)> {
    let item = open.last_mut()?;
    if depth != item.depth + 1 || item.capture.is_some() {
        return None;
    }
    let field = Field::from_name(e.name().as_ref())?;
    if field.slot(&mut item.raw).is_some() {
        return None;
    }
    Some((item, field))
}

fn open_capture(open: &mut [OpenItem]) -> Option<&mut Capture> {
    open.last_mut()?
        .capture
        .as_mut()
        .filter(|capture| !capture.sealed)
}
