use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tokio::task::spawn_blocking;

use crate::article::ArticleRecord;
use crate::tokenize::Tokenizer;
use crate::{Error, Result};

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static ARTICLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("article"));
static H1_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static H2_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("h2"));
static P_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static BUTTON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector("button"));

static CLAPS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">(\d+)<").expect("valid regex"));
/// Large counts are abbreviated, e.g. `4.7K`.
static CLAPS_K_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">([\d.]+)K<").expect("valid regex"));
static AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(@[^?/]+)\?source").expect("valid regex"));

/// Plain text and signals pulled out of one article page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedArticle {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub headers: Vec<String>,
    pub subheaders: Vec<String>,
    pub content: String,
    pub claps: u64,
    pub author: String,
}

impl ExtractedArticle {
    pub fn to_record(&self, tokenizer: &Tokenizer) -> Result<ArticleRecord> {
        let claps = i64::try_from(self.claps).map_err(|_| {
            Error::InvalidInput(format!("clap count out of range: {}", self.claps))
        })?;
        ArticleRecord::build(
            self.title.as_deref(),
            self.subtitle.as_deref(),
            Some(self.content.as_str()),
            &self.author,
            claps,
            tokenizer,
        )
    }
}

/// Finds every article link on a listing page of `publication` (e.g. `towardsdatascience.com`).
/// Links are cut right before their `?source` tracking query and deduplicated.
pub fn discover_article_urls(html: &str, publication: &str) -> BTreeSet<String> {
    let doc = Html::parse_document(html);
    doc.select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| article_url(href, publication))
        .collect()
}

/// `https://<publication>/<path>?source...` -> `https://<publication>/<path>`,
/// unless the path is an `@author` profile.
fn article_url(href: &str, publication: &str) -> Option<String> {
    let rest = href
        .strip_prefix("https://")
        .or_else(|| href.strip_prefix("http://"))?
        .strip_prefix(publication)?
        .strip_prefix('/')?;
    let (path, query) = rest.split_once('?')?;
    if path.is_empty() || path.starts_with('@') || !query.starts_with("source") {
        return None;
    }
    Some(href[..href.len() - rest.len() + path.len()].to_string())
}

/// Parses an article page on the blocking pool, `Html` is not `Send`.
pub(crate) async fn parse_article(html: String) -> Result<ExtractedArticle> {
    spawn_blocking(move || extract_article(&html)).await?
}

/// Extracts title, subtitle, headers and body text from the `<article>` element,
/// plus the clap count and author handle from the whole page.
pub fn extract_article(html: &str) -> Result<ExtractedArticle> {
    let doc = Html::parse_document(html);

    let article = doc
        .select(&ARTICLE_SELECTOR)
        .next()
        .ok_or_else(|| Error::ParseMissingSelector("article".into()))?;

    let (title, headers) = split_first(article.select(&H1_SELECTOR).map(element_text).collect());
    let (subtitle, subheaders) =
        split_first(article.select(&H2_SELECTOR).map(element_text).collect());

    let content = article
        .select(&P_SELECTOR)
        .map(element_text)
        .filter(|p| !p.starts_with("http"))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ExtractedArticle {
        title,
        subtitle,
        headers,
        subheaders,
        content,
        claps: extract_clap_count(&doc),
        author: extract_author_handle(&doc)?,
    })
}

/// Reads the clap counter from the first button that mentions claps.
/// Anything unreadable counts as 0.
pub fn extract_clap_count(doc: &Html) -> u64 {
    let Some(button) = doc
        .select(&BUTTON_SELECTOR)
        .map(|b| b.html())
        .find(|b| b.contains("claps"))
    else {
        return 0;
    };

    if let Some(caps) = CLAPS_RE.captures(&button) {
        return caps[1].parse().unwrap_or(0);
    }
    if let Some(caps) = CLAPS_K_RE.captures(&button) {
        let thousands: f64 = caps[1].parse().unwrap_or(0.0);
        return (thousands * 1e3).round() as u64;
    }
    0
}

/// The `@handle` of the first link pointing at an author profile.
pub fn extract_author_handle(doc: &Html) -> Result<String> {
    doc.select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .find_map(|href| AUTHOR_RE.captures(href).map(|caps| caps[1].to_string()))
        .ok_or(Error::AuthorNotFound)
}

fn selector(sel_str: &str) -> Selector {
    Selector::parse(sel_str).expect("valid selector")
}

#[inline]
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn split_first(mut items: Vec<String>) -> (Option<String>, Vec<String>) {
    if items.is_empty() {
        return (None, items);
    }
    let first = items.remove(0);
    (Some(first), items)
}
