use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::tokenize::{StopWords, Tokenizer};
use crate::{
    Result, DEFAULT_CONCURRENCY, DEFAULT_LISTING_URL, DEFAULT_OUT_DIR, DEFAULT_PUBLICATION,
};

/// Scrapes a publication and values every word by the claps its article earned.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Listing page to discover articles on
    #[arg(long, default_value = DEFAULT_LISTING_URL)]
    pub listing_url: String,

    /// Read the listing from a saved (fully scrolled) page instead of requesting it
    #[arg(long)]
    pub listing_file: Option<PathBuf>,

    /// Host whose article links are followed
    #[arg(long, default_value = DEFAULT_PUBLICATION)]
    pub publication: String,

    /// Directory language.json and authors.json are written to
    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// How many articles are requested at once
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Stop after this many articles (0 = all discovered)
    #[arg(short, long, default_value_t = 0)]
    pub limit: usize,

    /// Save the totals every N ingested articles (0 = only at the end)
    #[arg(long, default_value_t = 0)]
    pub save_every: usize,

    /// Newline separated stop word list, replaces the built-in English one
    #[arg(long)]
    pub stopwords: Option<PathBuf>,

    /// Don't load any stop words
    #[arg(long)]
    pub keep_stopwords: bool,

    /// Continue from the totals already in the output directory
    #[arg(long)]
    pub resume: bool,
}

impl Config {
    /// Loads the stop words once; the returned tokenizer shares them.
    pub fn tokenizer(&self) -> Result<Tokenizer> {
        let stopwords = if self.keep_stopwords {
            StopWords::empty()
        } else if let Some(path) = &self.stopwords {
            StopWords::from_file(path)?
        } else {
            StopWords::english()
        };
        Ok(Tokenizer::new(Arc::new(stopwords)))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            listing_file: None,
            publication: DEFAULT_PUBLICATION.to_string(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            limit: 0,
            save_every: 0,
            stopwords: None,
            keep_stopwords: false,
            resume: false,
        }
    }
}
