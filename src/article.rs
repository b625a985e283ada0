use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tokenize::Tokenizer;
use crate::valuate::{valuate, SectionValuation};
use crate::{Error, Result};

/// A text region of an article that is valued on its own.
/// Variants are ordered by name so persisted maps come out with sorted keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Content,
    Subtitle,
    Title,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Content, Section::Subtitle, Section::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Content => "content",
            Section::Subtitle => "subtitle",
            Section::Title => "title",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One article reduced to its author, its claps and the value of every word in it.
///
/// Records are only created through [`ArticleRecord::build`] or [`ArticleRecord::from_parts`],
/// both of which validate, so anything holding a record can trust it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    author_handle: String,
    engagement_score: u64,
    sections: BTreeMap<Section, SectionValuation>,
}

impl ArticleRecord {
    /// Tokenizes (stop words removed) and values every section that has text.
    /// Sections that are `None` or empty are left out of the record.
    pub fn build(
        title: Option<&str>,
        subtitle: Option<&str>,
        content: Option<&str>,
        author_handle: &str,
        engagement_score: i64,
        tokenizer: &Tokenizer,
    ) -> Result<Self> {
        validate_handle(author_handle)?;
        let engagement_score = u64::try_from(engagement_score).map_err(|_| {
            Error::InvalidInput(format!(
                "engagement score must not be negative, got {engagement_score}"
            ))
        })?;

        let sections = [
            (Section::Title, title),
            (Section::Subtitle, subtitle),
            (Section::Content, content),
        ]
        .into_iter()
        .filter_map(|(section, text)| text.filter(|t| !t.is_empty()).map(|t| (section, t)))
        .map(|(section, text)| {
            let tokens = tokenizer.tokenize(text, true);
            (section, valuate(&tokens, engagement_score as f64))
        })
        .collect();

        Ok(Self {
            author_handle: author_handle.to_string(),
            engagement_score,
            sections,
        })
    }

    /// Assembles a record from valuations computed elsewhere.
    pub fn from_parts(
        author_handle: &str,
        engagement_score: u64,
        sections: BTreeMap<Section, SectionValuation>,
    ) -> Result<Self> {
        validate_handle(author_handle)?;
        for (section, valuation) in &sections {
            if let Some((word, stat)) = valuation
                .iter()
                .find(|(_, s)| !s.value_per_word.is_finite() || s.value_per_word < 0.0)
            {
                return Err(Error::InvalidInput(format!(
                    "{section}: '{word}' has an invalid value per word {}",
                    stat.value_per_word
                )));
            }
        }

        Ok(Self {
            author_handle: author_handle.to_string(),
            engagement_score,
            sections,
        })
    }

    pub fn author_handle(&self) -> &str {
        &self.author_handle
    }

    pub fn engagement_score(&self) -> u64 {
        self.engagement_score
    }

    pub fn sections(&self) -> &BTreeMap<Section, SectionValuation> {
        &self.sections
    }

    pub fn section(&self, section: Section) -> Option<&SectionValuation> {
        self.sections.get(&section)
    }
}

fn validate_handle(handle: &str) -> Result<()> {
    if handle.is_empty() || handle.chars().any(char::is_whitespace) {
        return Err(Error::InvalidInput(format!(
            "malformed author handle: {handle:?}"
        )));
    }
    Ok(())
}
