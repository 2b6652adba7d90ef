//! Pipeline configuration.
//!
//! Selector strings and extraction patterns are the de facto schema contract
//! against the scraped site: they are supplied here, never derived. The
//! config is passed into the assembler at construction time — nothing in the
//! pipeline reads ambient state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Selects the offer summary nodes on the listing page.
pub const OFFERS_SELECTOR: &str = "ul#myList .box.row";
/// Selects the link(s) carrying href and title inside a listing node.
pub const TITLES_SELECTOR: &str = ".text-col h4 a";
/// Selects the short description inside a listing node.
pub const DESCRIPTION_SELECTOR: &str = ".text-col .entry-title a";
/// Selects the content nodes on an offer's detail page.
pub const DETAILS_SELECTOR: &str = ".detailsOffre > div:not(.content-area)";

/// Education-level tokens recognized in offer content (matched uppercased).
pub const DEGREE_PATTERN: &str = r"BAC\s?\+\s?[0-9]|BTS|DUT|LICENCE|MASTER|DOCTORAT";
/// Contract-type tokens recognized in offer content (matched uppercased).
pub const TYPE_PATTERN: &str = "CDI|CDD|STAGE|ALTERNANCE|FREELANCE";
/// Contract type assigned when no token matches.
pub const DEFAULT_TYPE: &str = "CDI";

/// Everything the assembler and parsers need, in one injected value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub offers_selector: String,
    pub titles_selector: String,
    pub description_selector: String,
    pub details_selector: String,
    pub degree_pattern: String,
    pub type_pattern: String,
    pub default_type: String,
    /// Width of the worker pool processing listing nodes.
    pub concurrency: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            offers_selector: OFFERS_SELECTOR.to_string(),
            titles_selector: TITLES_SELECTOR.to_string(),
            description_selector: DESCRIPTION_SELECTOR.to_string(),
            details_selector: DETAILS_SELECTOR.to_string(),
            degree_pattern: DEGREE_PATTERN.to_string(),
            type_pattern: TYPE_PATTERN.to_string(),
            default_type: DEFAULT_TYPE.to_string(),
            concurrency: 4,
        }
    }
}

impl ScrapeConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::ConfigError(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::ConfigError(format!("{}: {e}", path.display())))
    }
}
