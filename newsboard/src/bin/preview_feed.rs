use common::FeedConfig;
use newsboard::ingestion;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let url = ingestion::FEED_URL;
    let feed = FeedConfig::default();

    println!("\n{}", "=".repeat(60));
    println!("Previewing: {}", url);
    println!("{}", "=".repeat(60));

    match ingestion::fetch_feed_items(url, feed.max_items, feed.timeout_seconds).await {
        Ok(items) => {
            println!("✓ Success! {} items", items.len());
            for (i, item) in items.iter().enumerate() {
                println!("\n  {}. {}", i + 1, item.title);
                println!("     URL: {}", item.link);
                println!("     {}", item.description);
                println!("     HTML: {}", item.to_html());
            }
        }
        Err(e) => {
            println!("✗ Failed: {}", e);
        }
    }
}
