use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How often a word was seen and how many claps it carried.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WordStat {
    pub count: u64,
    #[serde(rename = "claps/word")]
    pub value_per_word: f64,
}

impl WordStat {
    pub fn new(count: u64, value_per_word: f64) -> Self {
        Self {
            count,
            value_per_word,
        }
    }

    /// Adds another stat onto this one. Both fields are plain running sums.
    pub fn absorb(&mut self, other: &WordStat) {
        self.count += other.count;
        self.value_per_word += other.value_per_word;
    }
}

/// Word -> stat for one section of text. Sorted by word.
pub type SectionValuation = BTreeMap<String, WordStat>;

/// Spreads `total_value` evenly over every token and sums the share of each distinct word.
///
/// An empty token list is an empty valuation, there is nothing to divide the value over.
pub fn valuate<S: AsRef<str>>(tokens: &[S], total_value: f64) -> SectionValuation {
    if tokens.is_empty() {
        return SectionValuation::new();
    }

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_ref()).or_default() += 1;
    }

    let value_per_token = total_value / tokens.len() as f64;
    counts
        .into_iter()
        .map(|(word, count)| {
            (
                word.to_string(),
                WordStat::new(count, count as f64 * value_per_token),
            )
        })
        .collect()
}
