use common::PageConfig;
use newsboard::error::UpdateError;
use newsboard::page::update_page_at;
use newsboard::render::NEWS_UNAVAILABLE;
use std::fs;
use std::path::Path;

const TEMPLATE: &str = r#"<html><body>
<h1>Daily news</h1>
<div id="news"></div>
<p>Last updated: <!-- 腳本會插入時間 --></p>
</body></html>"#;

const STAMP: &str = "2026-10-16 08:30:00 (台灣時間)";

fn write_page(dir: &Path, html: &str) -> std::path::PathBuf {
    let path = dir.join("index.html");
    fs::write(&path, html).expect("write page");
    path
}

fn items(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| format!("<li>{n}</li>")).collect()
}

#[tokio::test]
async fn test_items_and_timestamp_are_injected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_page(dir.path(), TEMPLATE);
    let config = PageConfig::default();

    let update = update_page_at(&path, &config, &items(&["a", "b"]), STAMP)
        .await
        .expect("update page");

    assert_eq!(update.items, 2);
    assert!(update.news_replaced && update.timestamp_replaced);

    let html = fs::read_to_string(&path).expect("read page");
    assert!(html.contains(r#"<div id="news"><ol><li>a</li><li>b</li></ol></div>"#));
    assert!(html.contains(&format!("<p>Last updated: {STAMP}</p>")));
    assert!(!html.contains("<!-- 腳本會插入時間 -->"));
    assert!(html.starts_with("<html><body>\n<h1>Daily news</h1>"));
}

#[tokio::test]
async fn test_rerun_replaces_previous_news() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_page(dir.path(), TEMPLATE);
    let config = PageConfig::default();

    update_page_at(&path, &config, &items(&["old one", "old two"]), STAMP)
        .await
        .expect("first update");
    update_page_at(&path, &config, &items(&["fresh"]), STAMP)
        .await
        .expect("second update");

    let html = fs::read_to_string(&path).expect("read page");
    assert!(html.contains(r#"<div id="news"><ol><li>fresh</li></ol></div>"#));
    assert!(!html.contains("old one"));
    assert_eq!(html.matches(r#"<div id="news">"#).count(), 1);
}

#[tokio::test]
async fn test_empty_items_show_fallback_and_still_stamp() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_page(dir.path(), TEMPLATE);

    let update = update_page_at(&path, &PageConfig::default(), &[], STAMP)
        .await
        .expect("update page");
    assert_eq!(update.items, 0);

    let html = fs::read_to_string(&path).expect("read page");
    assert!(html.contains(&format!(r#"<div id="news">{NEWS_UNAVAILABLE}</div>"#)));
    assert!(html.contains(STAMP));
}

#[tokio::test]
async fn test_markers_are_substituted_independently() {
    let dir = tempfile::tempdir().expect("tempdir");
    let page = "<main>static</main><footer><!-- 腳本會插入時間 --></footer>";
    let path = write_page(dir.path(), page);

    let update = update_page_at(&path, &PageConfig::default(), &items(&["a"]), STAMP)
        .await
        .expect("update page");
    assert!(!update.news_replaced);
    assert!(update.timestamp_replaced);

    let html = fs::read_to_string(&path).expect("read page");
    assert_eq!(html, format!("<main>static</main><footer>{STAMP}</footer>"));
}

#[tokio::test]
async fn test_hand_written_container_is_not_rewritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let page = r#"<div id="news"><div class="card">Loading</div></div><footer><!-- 腳本會插入時間 --></footer>"#;
    let path = write_page(dir.path(), page);

    let update = update_page_at(&path, &PageConfig::default(), &items(&["a"]), STAMP)
        .await
        .expect("update page");
    assert!(!update.news_replaced);

    let html = fs::read_to_string(&path).expect("read page");
    assert_eq!(
        html,
        format!(r#"<div id="news"><div class="card">Loading</div></div><footer>{STAMP}</footer>"#)
    );
    assert_eq!(html.matches("<div").count(), html.matches("</div>").count());
}

#[tokio::test]
async fn test_missing_page_is_not_created() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("index.html");

    let result = update_page_at(&path, &PageConfig::default(), &items(&["a"]), STAMP).await;

    assert!(matches!(result, Err(UpdateError::NotFound(_))));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[tokio::test]
async fn test_no_temp_file_left_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_page(dir.path(), TEMPLATE);

    update_page_at(&path, &PageConfig::default(), &items(&["a"]), STAMP)
        .await
        .expect("update page");

    let names: Vec<String> = fs::read_dir(dir.path())
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["index.html".to_string()]);
}
