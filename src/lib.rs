//! Scrapes a publication's articles and values every word by the claps its article earned.
//!
//! The pipeline is `tokenize` -> `valuate` -> `article` -> `metrics`; those four modules are
//! pure and never touch the network. `request`, `parse`, `process` and `store` wrap them into
//! a scraper that writes `language.json` and `authors.json`.

pub mod article;
pub mod config;
mod error;
mod macros;
pub mod metrics;
pub mod parse;
pub mod process;
mod request;
pub mod store;
pub mod tokenize;
pub mod valuate;

pub use error::{Error, Result};

pub const DEFAULT_LISTING_URL: &str = "https://towardsdatascience.com/latest";
pub const DEFAULT_PUBLICATION: &str = "towardsdatascience.com";
pub const DEFAULT_OUT_DIR: &str = "data";
pub const DEFAULT_CONCURRENCY: usize = 16;
const RECORD_CHANNEL_SIZE: usize = 256;
const LANGUAGE_FILE: &str = "language.json";
const AUTHORS_FILE: &str = "authors.json";
