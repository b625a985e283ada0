use chrono::Local;
use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::article::ArticleRecord;
use crate::config::Config;
use crate::metrics::{Metrics, MetricsState};
use crate::parse::{discover_article_urls, parse_article};
use crate::request::{load_listing, request_articles};
use crate::tokenize::Tokenizer;
use crate::{info_time, store, Result, RECORD_CHANNEL_SIZE};

/// Scrapes every article on the listing, folds them into the totals and saves them.
pub async fn process_site(config: Config) -> Result<MetricsState> {
    let start_time = Local::now();
    let client = Client::new();
    let tokenizer = config.tokenizer()?;

    info_time!("Started scraping");

    let listing = load_listing(&client, &config).await?;
    let mut urls = discover_article_urls(&listing, &config.publication);
    if config.limit > 0 {
        urls = urls.into_iter().take(config.limit).collect();
    }
    info_time!("Discovered {} articles", urls.len());

    let metrics = if config.resume {
        Metrics::from_state(store::load(&config.out_dir)?)
    } else {
        Metrics::new()
    };

    let (record_tx, record_rx) = mpsc::channel(RECORD_CHANNEL_SIZE);
    let collect_handle = tokio::spawn({
        let config = config.clone();
        async move { collect_records(metrics, record_rx, &config).await }
    });

    let processed =
        process_articles(client, urls, tokenizer, record_tx, config.concurrency).await;
    info_time!(start_time, "Finished PROCESSING ALL articles.");

    // A collector that stopped early closes the channel, so its error comes first.
    let state = collect_handle.await??;
    processed?;
    let local_now = Local::now();
    store::save(&state, &config.out_dir)?;
    info_time!(local_now, "Wrote the results to: {}", config.out_dir.display());

    Ok(state)
}

/// The single owner of `Metrics`: every record is ingested here, one at a time.
/// Saves intermediate totals every `save_every` records when that is set.
async fn collect_records(
    mut metrics: Metrics,
    mut record_rx: mpsc::Receiver<ArticleRecord>,
    config: &Config,
) -> Result<MetricsState> {
    info_time!("Started collecting records");
    let start_time = Local::now();
    let mut ingested = 0usize;

    while let Some(record) = record_rx.recv().await {
        let author = record.author_handle().to_string();
        debug!(%author, claps = record.engagement_score(), "ingesting");
        if let Err(e) = metrics.ingest(record) {
            warn!(%author, error = %e, "skipping record");
            continue;
        }
        ingested += 1;

        if config.save_every > 0 && ingested % config.save_every == 0 {
            store::save(&metrics.snapshot(), &config.out_dir)?;
        }
    }

    info_time!(
        start_time,
        "DONE: {} records this run, {} articles by {} authors in total",
        ingested,
        metrics.article_count(),
        metrics.author_count()
    );
    Ok(metrics.snapshot())
}

/// Requests all articles, parses each as it arrives and sends its record to the collector.
/// Articles that fail to download or extract are logged and skipped.
async fn process_articles(
    client: Client,
    urls: impl IntoIterator<Item = String>,
    tokenizer: Tokenizer,
    record_tx: mpsc::Sender<ArticleRecord>,
    concurrency: usize,
) -> Result<()> {
    let mut requests = request_articles(client, urls, concurrency);

    while let Some(task) = requests.join_next().await {
        let (url, html) = task?;
        match build_record(html, &tokenizer).await {
            Ok(record) => record_tx.send(record).await?,
            Err(e) => warn!(%url, error = %e, "skipping article"),
        }
    }
    Ok(())
}

async fn build_record(html: Result<String>, tokenizer: &Tokenizer) -> Result<ArticleRecord> {
    let extracted = parse_article(html?).await?;
    extracted.to_record(tokenizer)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;
    use crate::article::Section;
    use crate::valuate::{SectionValuation, WordStat};

    fn record(handle: &str, claps: u64) -> ArticleRecord {
        let valuation =
            SectionValuation::from([("fox".to_string(), WordStat::new(1, claps as f64))]);
        ArticleRecord::from_parts(handle, claps, BTreeMap::from([(Section::Title, valuation)]))
            .unwrap()
    }

    #[tokio::test]
    async fn test_collector_saves_while_records_keep_coming() {
        let out = tempfile::tempdir().unwrap();
        let config = Config {
            out_dir: out.path().to_path_buf(),
            save_every: 1,
            ..Config::default()
        };

        let (record_tx, record_rx) = mpsc::channel(4);
        let handle = tokio::spawn({
            let config = config.clone();
            async move { collect_records(Metrics::new(), record_rx, &config).await }
        });

        record_tx.send(record("@alice", 5)).await.unwrap();
        // The sender is still open, so anything on disk was written by a periodic save.
        let mut saved = None;
        for _ in 0..200 {
            if let Ok(state) = store::load(out.path()) {
                if state.authors.contains_key("@alice") {
                    saved = Some(state);
                    break;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let saved = saved.expect("totals saved before the channel closed");
        assert_eq!(saved.authors["@alice"].total_claps, 5);

        drop(record_tx);
        let state = handle.await.unwrap().unwrap();
        assert_eq!(state, saved);
    }

    #[tokio::test]
    async fn test_collector_skips_overflowing_records() {
        let out = tempfile::tempdir().unwrap();
        let config = Config {
            out_dir: out.path().to_path_buf(),
            ..Config::default()
        };
        let (record_tx, record_rx) = mpsc::channel(4);
        record_tx.send(record("@alice", u64::MAX)).await.unwrap();
        record_tx.send(record("@alice", 1)).await.unwrap();
        record_tx.send(record("@bob", 1)).await.unwrap();
        drop(record_tx);

        let state = collect_records(Metrics::new(), record_rx, &config).await.unwrap();
        assert_eq!(state.authors["@alice"].total_claps, u64::MAX);
        assert_eq!(state.authors["@alice"].article_count, 1);
        assert_eq!(state.authors["@bob"].total_claps, 1);
    }
}
