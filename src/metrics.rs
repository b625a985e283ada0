use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::article::{ArticleRecord, Section};
use crate::valuate::SectionValuation;
use crate::{Error, Result};

/// Running totals for one author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStat {
    #[serde(rename = "claps")]
    pub total_claps: u64,
    #[serde(rename = "count")]
    pub article_count: u64,
}

/// Everything the aggregator has accumulated so far.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsState {
    pub authors: BTreeMap<String, AuthorStat>,
    pub language: BTreeMap<Section, SectionValuation>,
}

/// Accumulates author and word totals over every ingested article.
///
/// `ingest` needs `&mut self`: when articles are processed concurrently a single task owns
/// the `Metrics` and records are funneled to it (see `process`).
#[derive(Debug, Default)]
pub struct Metrics {
    state: MetricsState,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues accumulating on top of a previously saved state.
    pub fn from_state(state: MetricsState) -> Self {
        Self { state }
    }

    /// Folds one article into the running totals.
    ///
    /// Word totals are plain sums of each article's contribution; they are never
    /// renormalized against the size of the corpus.
    ///
    /// Nothing is changed when a total would overflow, the record is rejected with
    /// `InvalidInput` instead.
    pub fn ingest(&mut self, record: ArticleRecord) -> Result<()> {
        let author = self.next_author_stat(&record)?;
        self.check_word_counts(&record)?;

        self.state
            .authors
            .insert(record.author_handle().to_string(), author);

        for (section, valuation) in record.sections() {
            let totals = self.state.language.entry(*section).or_default();
            for (word, stat) in valuation {
                match totals.get_mut(word) {
                    Some(total) => total.absorb(stat),
                    None => {
                        totals.insert(word.clone(), *stat);
                    }
                }
            }
        }
        Ok(())
    }

    fn next_author_stat(&self, record: &ArticleRecord) -> Result<AuthorStat> {
        let score = record.engagement_score();
        let Some(current) = self.state.authors.get(record.author_handle()) else {
            return Ok(AuthorStat {
                total_claps: score,
                article_count: 1,
            });
        };

        let total_claps = current.total_claps.checked_add(score).ok_or_else(|| {
            Error::InvalidInput(format!(
                "claps for {} overflow: {} + {score}",
                record.author_handle(),
                current.total_claps
            ))
        })?;
        let article_count = current.article_count.checked_add(1).ok_or_else(|| {
            Error::InvalidInput(format!("article count for {} overflows", record.author_handle()))
        })?;
        Ok(AuthorStat {
            total_claps,
            article_count,
        })
    }

    fn check_word_counts(&self, record: &ArticleRecord) -> Result<()> {
        for (section, valuation) in record.sections() {
            let Some(totals) = self.state.language.get(section) else {
                continue;
            };
            for (word, stat) in valuation {
                let overflows = totals
                    .get(word)
                    .is_some_and(|total| total.count.checked_add(stat.count).is_none());
                if overflows {
                    return Err(Error::InvalidInput(format!(
                        "{section}: count for '{word}' overflows"
                    )));
                }
            }
        }
        Ok(())
    }

    /// A copy of the current totals. Does not touch the accumulator.
    pub fn snapshot(&self) -> MetricsState {
        self.state.clone()
    }

    pub fn article_count(&self) -> u64 {
        self.state
            .authors
            .values()
            .fold(0u64, |n, a| n.saturating_add(a.article_count))
    }

    pub fn author_count(&self) -> usize {
        self.state.authors.len()
    }
}
