use regex::Regex;
use std::sync::OnceLock;

/// Shown in place of an empty `<title>`.
pub const TITLE_PLACEHOLDER: &str = "無標題";
/// Used as the href when `<link>` is present but empty.
pub const LINK_PLACEHOLDER: &str = "#";
/// Shown when `<description>` is absent or empty.
pub const DESCRIPTION_PLACEHOLDER: &str = "無描述";
/// Injected into the news container when no item could be rendered.
pub const NEWS_UNAVAILABLE: &str = "<p>無法載入新聞，請稍後再試。</p>";

/// Descriptions longer than this many characters are cut and suffixed with `...`.
pub const DESCRIPTION_MAX_CHARS: usize = 100;

/// Raw child text of one `<item>`, exactly as found in the feed.
///
/// `None` means the child element was absent; `Some("")` means it was present but
/// had no text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

/// A feed entry ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl FeedItem {
    /// Builds an item from raw feed text. Returns `None` when `title` or `link` is
    /// missing altogether; such entries are left out of the page.
    pub fn from_raw(raw: RawItem) -> Option<Self> {
        let title = raw.title?;
        let link = raw.link?;

        Some(FeedItem {
            title: non_empty_or(title, TITLE_PLACEHOLDER),
            link: non_empty_or(link, LINK_PLACEHOLDER),
            description: clean_description(raw.description.as_deref()),
        })
    }

    /// `<li>` entry linking to the article in a new tab.
    ///
    /// Title and link are inserted verbatim.
    pub fn to_html(&self) -> String {
        format!(
            r#"<li><a href="{}" target="_blank">{}</a>: {}</li>"#,
            self.link, self.title, self.description
        )
    }
}

fn non_empty_or(value: String, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}

/// Truncates, then strips tags from a feed description.
pub fn clean_description(description: Option<&str>) -> String {
    match description {
        Some(text) if !text.is_empty() => strip_tags(&truncate_chars(text, DESCRIPTION_MAX_CHARS)),
        _ => DESCRIPTION_PLACEHOLDER.to_string(),
    }
}

/// Keeps the first `max_chars` characters, appending `...` if anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Removes `<...>`-shaped substrings.
///
/// This is a single regex pass, not an HTML parser: a tag cut in half by truncation,
/// a stray `<` without a closing `>`, or escaped markup all survive.
pub fn strip_tags(text: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let re = TAG.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));
    re.replace_all(text, "").into_owned()
}

/// Inner HTML of the news container for the given rendered items.
pub fn news_fragment(items: &[String]) -> String {
    if items.is_empty() {
        NEWS_UNAVAILABLE.to_string()
    } else {
        format!("<ol>{}</ol>", items.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: Option<&str>, link: Option<&str>, description: Option<&str>) -> RawItem {
        RawItem {
            title: title.map(str::to_string),
            link: link.map(str::to_string),
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn missing_title_or_link_is_skipped() {
        assert!(FeedItem::from_raw(raw(None, Some("https://a"), Some("d"))).is_none());
        assert!(FeedItem::from_raw(raw(Some("t"), None, Some("d"))).is_none());
    }

    #[test]
    fn empty_fields_fall_back_to_placeholders() {
        let item = FeedItem::from_raw(raw(Some(""), Some(""), None)).expect("item");
        assert_eq!(item.title, TITLE_PLACEHOLDER);
        assert_eq!(item.link, "#");
        assert_eq!(item.description, DESCRIPTION_PLACEHOLDER);

        let item = FeedItem::from_raw(raw(Some("t"), Some("l"), Some(""))).expect("item");
        assert_eq!(item.description, DESCRIPTION_PLACEHOLDER);
    }

    #[test]
    fn long_description_is_cut_at_100_chars() {
        let text = "a".repeat(150);
        let cleaned = clean_description(Some(&text));
        assert_eq!(cleaned, format!("{}...", "a".repeat(100)));
    }

    #[test]
    fn short_description_passes_through() {
        let exact = "b".repeat(100);
        assert_eq!(clean_description(Some(&exact)), exact);
        assert_eq!(clean_description(Some("Short news.")), "Short news.");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "新".repeat(101);
        assert_eq!(truncate_chars(&text, 100), format!("{}...", "新".repeat(100)));
    }

    #[test]
    fn tags_are_stripped_after_truncation() {
        assert_eq!(
            clean_description(Some("<p>Markets <b>rally</b> again</p>")),
            "Markets rally again"
        );

        // The cut lands inside the tag, so the half tag has no `>` and survives.
        let text = format!("{}<a href=\"x\">tail</a>", "c".repeat(98));
        assert_eq!(clean_description(Some(&text)), format!("{}<a...", "c".repeat(98)));
    }

    #[test]
    fn strip_tags_is_best_effort() {
        assert_eq!(strip_tags("1 < 2 and 3 > 2"), "1  2");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn item_renders_as_list_entry() {
        let item = FeedItem {
            title: "Headline".to_string(),
            link: "https://news.example/1".to_string(),
            description: "Body".to_string(),
        };
        assert_eq!(
            item.to_html(),
            r#"<li><a href="https://news.example/1" target="_blank">Headline</a>: Body</li>"#
        );
    }

    #[test]
    fn fragment_wraps_items_or_falls_back() {
        assert_eq!(news_fragment(&[]), NEWS_UNAVAILABLE);
        let items = vec!["<li>1</li>".to_string(), "<li>2</li>".to_string()];
        assert_eq!(news_fragment(&items), "<ol><li>1</li><li>2</li></ol>");
    }
}
