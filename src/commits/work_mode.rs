//! Work-mode classification for commits
//!
//! Priority order:
//! 1. Conventional-commit type table
//! 2. Keyword patterns over description and raw message
//! 3. Insertion/deletion ratio
//! 4. `Tweaking`

use super::parse::ParsedCommit;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// What kind of work a commit represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    Building,
    Debugging,
    Restructuring,
    Testing,
    Documenting,
    Infrastructure,
    Optimizing,
    Reverting,
    Tweaking,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Building => "building",
            WorkMode::Debugging => "debugging",
            WorkMode::Restructuring => "restructuring",
            WorkMode::Testing => "testing",
            WorkMode::Documenting => "documenting",
            WorkMode::Infrastructure => "infrastructure",
            WorkMode::Optimizing => "optimizing",
            WorkMode::Reverting => "reverting",
            WorkMode::Tweaking => "tweaking",
        }
    }

    /// Direct conventional-commit type mapping
    pub fn from_commit_type(commit_type: &str) -> Option<Self> {
        let mode = match commit_type {
            "feat" => WorkMode::Building,
            "fix" => WorkMode::Debugging,
            "refactor" | "style" => WorkMode::Restructuring,
            "test" => WorkMode::Testing,
            "docs" => WorkMode::Documenting,
            "chore" | "build" | "ci" => WorkMode::Infrastructure,
            "perf" => WorkMode::Optimizing,
            "revert" => WorkMode::Reverting,
            _ => return None,
        };
        Some(mode)
    }
}

impl std::fmt::Display for WorkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn keyword_rules() -> &'static [(Regex, WorkMode)] {
    static RULES: Lazy<Vec<(Regex, WorkMode)>> = Lazy::new(|| {
        [
            (r"(?i)\brevert(s|ed|ing)?\b", WorkMode::Reverting),
            (r"(?i)\b(tests?|testing|specs?|coverage)\b", WorkMode::Testing),
            (r"(?i)\b(docs?|documentation|readme|changelog|comments?)\b", WorkMode::Documenting),
            (
                r"(?i)\b(bugs?|bugfix|errors?|crash(es|ed)?|fix(es|ed)?|broken|issue|regression|panic)\b",
                WorkMode::Debugging,
            ),
            (
                r"(?i)\b(add(s|ed)?|implement(s|ed)?|introduce[sd]?|create[sd]?|support|feature|new)\b",
                WorkMode::Building,
            ),
            (
                r"(?i)\b(refactor(s|ed|ing)?|restructure[sd]?|rename[sd]?|extract(s|ed)?|clean(ed)?\s*up|cleanup|simplif(y|ies|ied)|reorganiz(e|ed))\b",
                WorkMode::Restructuring,
            ),
        ]
        .into_iter()
        .map(|(pattern, mode)| {
            (
                Regex::new(pattern).expect("Valid work mode keyword regex"),
                mode,
            )
        })
        .collect()
    });
    &RULES
}

/// Mode implied by the shape of the diff alone
pub fn mode_from_diff_ratio(insertions: u32, deletions: u32) -> Option<WorkMode> {
    match (insertions, deletions) {
        (0, 0) => None,
        (_, 0) => Some(WorkMode::Building),
        (0, _) => Some(WorkMode::Restructuring),
        (ins, del) => {
            let ratio = ins as f64 / del as f64;
            if ratio > 3.0 {
                Some(WorkMode::Building)
            } else if ratio < 0.33 {
                Some(WorkMode::Restructuring)
            } else {
                None
            }
        }
    }
}

/// Classify a parsed commit into a work mode
pub fn classify_work_mode(commit: &ParsedCommit, insertions: u32, deletions: u32) -> WorkMode {
    if let Some(mode) = WorkMode::from_commit_type(&commit.commit_type) {
        return mode;
    }

    let haystack = format!("{}\n{}", commit.description, commit.raw);
    if let Some((_, mode)) = keyword_rules().iter().find(|(re, _)| re.is_match(&haystack)) {
        return *mode;
    }

    mode_from_diff_ratio(insertions, deletions).unwrap_or(WorkMode::Tweaking)
}
