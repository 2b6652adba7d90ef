use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum href length for a listing node to be eligible for enrichment
/// and persistence.
pub const MIN_URL_LEN: usize = 11;

/// Normalized education-level requirement (e.g. "BAC+5", "MASTER").
///
/// Equality is by token value; an offer's degree set never holds the same
/// token twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degree(String);

impl Degree {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Category label assigned by the external classifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A job posting being built by the pipeline.
///
/// Created per listing node and mutated in place through content fetch,
/// degree/type extraction and classification, then handed once to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Full text of the detail page, fetched separately. May be empty.
    #[serde(default)]
    pub content: String,
    /// Raw publish-date token from the listing node, unvalidated.
    pub published: Option<String>,
    /// Raw expiry-date token from the listing node, unvalidated.
    pub expires: Option<String>,
    #[serde(default)]
    pub degrees: Vec<Degree>,
    /// Never empty once enriched: falls back to the configured default.
    #[serde(default)]
    pub contract_type: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Offer {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        published: Option<String>,
        expires: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: description.into(),
            content: String::new(),
            published,
            expires,
            degrees: Vec::new(),
            contract_type: String::new(),
            tags: Vec::new(),
        }
    }
}

/// Why a listing node was skipped without persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The extracted href did not reach [`MIN_URL_LEN`].
    UrlTooShort,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UrlTooShort => write!(f, "href shorter than {MIN_URL_LEN} characters"),
        }
    }
}

/// Outcome of processing a single listing node.
#[derive(Debug)]
pub enum NodeOutcome {
    Persisted { url: String },
    Skipped { href: String, reason: SkipReason },
    Failed { url: String, error: AppError },
}

/// Aggregated result of one listing-page run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<NodeOutcome>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<NodeOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn persisted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, NodeOutcome::Persisted { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, NodeOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, NodeOutcome::Failed { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
