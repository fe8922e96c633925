//! Room annotation codes recognized in cell text.
//!
//! The codes are an ordered table of (kind, pattern) pairs. Every rule is
//! tried against the text, so one text can yield several matches; results
//! come back in table order.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Annotation code types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatternKind {
    Lp,
    /// Time of day, e.g. a scheduled check-out
    Time,
    /// Do not disturb
    Dnd,
    /// Service refused
    Refus,
    /// Out of order
    Ooo,
    /// Maintenance
    Maint,
    /// Departure
    Dep,
    /// Arrival
    Arr,
    /// Stay-over
    Stay,
    Vip,
}

/// Matching order and patterns. Patterns are case-insensitive.
pub const DEFAULT_RULES: &[(PatternKind, &str)] = &[
    (PatternKind::Lp, "LP"),
    (PatternKind::Time, r"\d{1,2}:\d{2}"),
    (PatternKind::Dnd, "DND"),
    (PatternKind::Refus, "REFUS"),
    (PatternKind::Ooo, "OOO"),
    (PatternKind::Maint, "MAINT"),
    (PatternKind::Dep, "DEP"),
    (PatternKind::Arr, "ARR"),
    (PatternKind::Stay, "STAY"),
    (PatternKind::Vip, "VIP"),
];

/// One code found in a text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    #[serde(rename = "type")]
    pub kind: PatternKind,
    /// The matched substring, as written in the text
    pub value: String,
    /// Character offset of the match in the text
    pub position: usize,
}

#[derive(Debug, Clone)]
struct PatternRule {
    kind: PatternKind,
    regex: Regex,
}

/// Compiled rule table.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rules: Vec<PatternRule>,
}

impl PatternMatcher {
    /// Compiles the built-in rule table.
    pub fn new() -> Result<Self, regex::Error> {
        Self::with_rules(DEFAULT_RULES)
    }

    /// Compiles a custom rule table, keeping its order.
    pub fn with_rules(rules: &[(PatternKind, &str)]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|&(kind, pattern)| {
                let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
                Ok(PatternRule { kind, regex })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// Returns the first occurrence of every rule that matches, in table order.
    pub fn find(&self, text: &str) -> Vec<PatternMatch> {
        self.rules
            .iter()
            .filter_map(|rule| {
                rule.regex.find(text).map(|m| PatternMatch {
                    kind: rule.kind,
                    value: m.as_str().to_string(),
                    position: text[..m.start()].chars().count(),
                })
            })
            .collect()
    }
}

/// Space-joined matched values, or the raw text when nothing matched.
pub fn format_matches(matches: &[PatternMatch], raw_text: &str) -> String {
    if matches.is_empty() {
        return raw_text.to_string();
    }
    matches
        .iter()
        .map(|m| m.value.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PatternMatcher {
        PatternMatcher::new().unwrap()
    }

    #[test]
    fn test_time_and_dnd() {
        let matches = matcher().find("14:30 DND");
        assert_eq!(
            matches,
            vec![
                PatternMatch { kind: PatternKind::Time, value: "14:30".to_string(), position: 0 },
                PatternMatch { kind: PatternKind::Dnd, value: "DND".to_string(), position: 6 },
            ]
        );
    }

    #[test]
    fn test_case_insensitive_keeps_matched_case() {
        let matches = matcher().find("vip arr");
        let kinds: Vec<PatternKind> = matches.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![PatternKind::Arr, PatternKind::Vip]);
        assert_eq!(matches[1].value, "vip");
        assert_eq!(matches[1].position, 0);
    }

    #[test]
    fn test_results_follow_table_order() {
        // VIP appears first in the text but last in the table.
        let matches = matcher().find("VIP OOO 9:05");
        let kinds: Vec<PatternKind> = matches.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![PatternKind::Time, PatternKind::Ooo, PatternKind::Vip]);
        assert_eq!(matches[0].value, "9:05");
        assert_eq!(matches[0].position, 8);
    }

    #[test]
    fn test_first_occurrence_only() {
        let matches = matcher().find("DND DND");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].position, 0);
    }

    #[test]
    fn test_no_match() {
        assert!(matcher().find("").is_empty());
        assert!(matcher().find("HELLO 12").is_empty());
    }

    #[test]
    fn test_position_counts_characters() {
        let matches = matcher().find("é DEP");
        assert_eq!(matches[0].kind, PatternKind::Dep);
        assert_eq!(matches[0].position, 2);
    }

    #[test]
    fn test_custom_rules_are_appended_data() {
        let mut rules = DEFAULT_RULES.to_vec();
        rules.push((PatternKind::Stay, "SO"));
        let matcher = PatternMatcher::with_rules(&rules).unwrap();
        let matches = matcher.find("SO");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PatternKind::Stay);
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        assert!(PatternMatcher::with_rules(&[(PatternKind::Lp, "(")]).is_err());
    }

    #[test]
    fn test_format_matches() {
        let matches = matcher().find("14:30 DND");
        assert_eq!(format_matches(&matches, "14:30 DND"), "14:30 DND");
        assert_eq!(format_matches(&[], "hello"), "hello");
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&PatternKind::Refus).unwrap(), "\"REFUS\"");
        assert_eq!(serde_json::to_string(&PatternKind::Lp).unwrap(), "\"LP\"");
    }
}
