//! Specialized parsers built on [`extract_field`]: education degrees,
//! contract type, and date tokens.

use std::collections::HashSet;

use regex::Regex;

use crate::error::AppError;
use crate::fields::extract_field;
use crate::models::Degree;

/// Extracts education-level requirements from offer content.
#[derive(Debug, Clone)]
pub struct DegreeParser {
    pattern: Regex,
}

impl DegreeParser {
    pub fn new(pattern: &str) -> Result<Self, AppError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Distinct degree tokens found in `text`, in first-encounter order.
    ///
    /// Input is uppercased before matching; a token repeated in the source
    /// yields a single [`Degree`]. Zero matches yield an empty set.
    pub fn extract(&self, text: &str) -> Vec<Degree> {
        let matches = extract_field(&self.pattern, &text.to_uppercase());
        let mut seen = HashSet::new();
        matches
            .into_iter()
            .filter(|token| seen.insert(token.clone()))
            .map(Degree::new)
            .collect()
    }
}

/// Extracts the contract type, falling back to a configured default.
#[derive(Debug, Clone)]
pub struct ContractTypeParser {
    pattern: Regex,
    default: String,
}

impl ContractTypeParser {
    pub fn new(pattern: &str, default: impl Into<String>) -> Result<Self, AppError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            default: default.into(),
        })
    }

    /// First contract-type token in the uppercased `text`, or the default.
    pub fn extract(&self, text: &str) -> String {
        extract_field(&self.pattern, &text.to_uppercase())
            .first()
            .map_or_else(|| self.default.clone(), str::to_string)
    }
}

/// Scans arbitrary text for day/month/year-looking tokens.
///
/// Purely lexical: every match is returned in document order with no
/// dedup and no calendar validation.
#[derive(Debug, Clone)]
pub struct DateParser {
    pattern: Regex,
}

impl DateParser {
    /// Two-digit, two-digit, four-digit groups separated by an optional
    /// slash or single whitespace.
    pub const PATTERN: &'static str = r"[0-9]{2}[/\s]?[0-9]{2}[/\s]?[0-9]{4}";

    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            pattern: Regex::new(Self::PATTERN)?,
        })
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        extract_field(&self.pattern, text).into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    fn degree_parser() -> DegreeParser {
        DegreeParser::new(config::DEGREE_PATTERN).unwrap()
    }

    fn type_parser() -> ContractTypeParser {
        ContractTypeParser::new(config::TYPE_PATTERN, config::DEFAULT_TYPE).unwrap()
    }

    #[test]
    fn test_repeated_degree_token_dedupes() {
        let degrees = degree_parser().extract("Profil BAC+5 exigé. Rappel: bac + 5 minimum.");
        assert_eq!(degrees, vec![Degree::new("BAC+5")]);
    }

    #[test]
    fn test_degree_cluster_yields_each_alternative() {
        // "BAC+5/MASTER" carries two distinct qualifications
        let degrees = degree_parser().extract("Niveau BAC+5/MASTER demandé");
        assert_eq!(degrees, vec![Degree::new("BAC+5"), Degree::new("MASTER")]);
    }

    #[test]
    fn test_no_degree_yields_empty_set() {
        assert!(degree_parser().extract("aucune exigence").is_empty());
    }

    #[test]
    fn test_degree_matching_is_case_insensitive() {
        let degrees = degree_parser().extract("master ou licence");
        assert_eq!(
            degrees,
            vec![Degree::new("MASTER"), Degree::new("LICENCE")]
        );
    }

    #[test]
    fn test_unrecognized_type_falls_back_to_default() {
        assert_eq!(type_parser().extract("poste à pourvoir"), config::DEFAULT_TYPE);
    }

    #[test]
    fn test_first_type_token_wins() {
        assert_eq!(type_parser().extract("cdd puis CDI possible"), "CDD");
    }

    #[test]
    fn test_dates_in_document_order_with_whitespace_stripped() {
        let dates = DateParser::new()
            .unwrap()
            .extract("Published 01/02/2023 expires 15 03 2023");
        assert_eq!(dates, vec!["01/02/2023", "15032023"]);
    }

    #[test]
    fn test_dates_are_not_deduplicated() {
        let dates = DateParser::new().unwrap().extract("01/02/2023 et 01/02/2023");
        assert_eq!(dates.len(), 2);
    }

    #[test]
    fn test_dates_skip_calendar_validation() {
        // 99/99/9999 is lexically a date token
        let dates = DateParser::new().unwrap().extract("le 99/99/9999");
        assert_eq!(dates, vec!["99/99/9999"]);
    }
}
