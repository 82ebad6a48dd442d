//! Conventional-commit message parsing
//!
//! `type(scope)!: description` on the first line. Messages that don't follow
//! the grammar keep their whole subject as the description and an empty type.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A commit message split into its conventional-commit parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommit {
    /// Lowercased type, empty when the message isn't conventional
    #[serde(rename = "type")]
    pub commit_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
    /// The full original message
    pub raw: String,
}

impl ParsedCommit {
    pub fn is_conventional(&self) -> bool {
        !self.commit_type.is_empty()
    }
}

fn conventional_header() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^([A-Za-z]+)(?:\(([^()]*)\))?(!)?:\s*(.+)$")
            .expect("Valid conventional commit regex")
    });
    &PATTERN
}

fn breaking_footer() -> &'static Regex {
    static PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^BREAKING[ -]CHANGE:").expect("Valid breaking change regex")
    });
    &PATTERN
}

/// Parse a commit message
pub fn parse_commit_message(message: &str) -> ParsedCommit {
    let subject = message.lines().next().unwrap_or_default().trim();
    let footer_breaking = breaking_footer().is_match(message);

    if let Some(caps) = conventional_header().captures(subject) {
        let scope = caps
            .get(2)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        return ParsedCommit {
            commit_type: caps[1].to_lowercase(),
            scope,
            breaking: caps.get(3).is_some() || footer_breaking,
            description: caps[4].trim().to_string(),
            raw: message.to_string(),
        };
    }

    ParsedCommit {
        commit_type: String::new(),
        scope: None,
        breaking: footer_breaking,
        description: subject.to_string(),
        raw: message.to_string(),
    }
}
