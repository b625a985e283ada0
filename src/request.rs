use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::{info_time, Result};

/// Returns a `JoinSet` of all the article requests, so that they can be awaited as they finish.
/// At most `concurrency` requests are in flight at once.
/// Every result is paired with its url so failures can be reported.
pub(crate) fn request_articles(
    client: Client,
    urls: impl IntoIterator<Item = String>,
    concurrency: usize,
) -> JoinSet<(String, Result<String>)> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut task_set = JoinSet::new();

    for url in urls {
        task_set.spawn({
            // Client uses Arc so we can clone cheaply
            let client = client.clone();
            let permits = permits.clone();

            async move {
                // The semaphore is never closed.
                let _permit = permits.acquire_owned().await.ok();
                let html = request_html(&client, &url).await;
                (url, html)
            }
        });
    }
    task_set
}

/// Requests a page and returns a `Result<String>` containing the HTML.
pub async fn request_html(client: &Client, url: &str) -> Result<String> {
    let res = client.get(url).send().await?.error_for_status()?;
    let html = res.text().await?;
    Ok(html)
}

/// Returns the listing page that article links are discovered on.
///
/// Listings load more articles as you scroll, so a plain GET only sees the first batch.
/// Pass a page saved from a browser after scrolling with `--listing-file` to see all of them.
pub(crate) async fn load_listing(client: &Client, config: &Config) -> Result<String> {
    match &config.listing_file {
        Some(path) => {
            info_time!("Reading listing from {}", path.display());
            Ok(tokio::fs::read_to_string(path).await?)
        }
        None => {
            info_time!("Requesting listing: {}", config.listing_url);
            request_html(client, &config.listing_url).await
        }
    }
}
