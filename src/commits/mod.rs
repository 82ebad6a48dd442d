//! Commit work-unit extraction
//!
//! Turns a day's raw commits into labeled "work units": session-scoped groups
//! of commits with a dominant work mode, an optional causal "why" clause, and
//! a flag for groups made only of WIP/trivial messages.

pub mod parse;
pub mod sessions;
pub mod work_mode;

pub use parse::{parse_commit_message, ParsedCommit};
pub use work_mode::{classify_work_mode, WorkMode};

use crate::classification::normalize::{parse_timestamp, GitCommitRecord};
use crate::utils::clamp_chars;
use crate::vocabulary::Vocabulary;
use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Longest why-clause kept on a work unit
pub const MAX_WHY_CHARS: usize = 120;

/// A commit with its parsed message and work mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnitCommit {
    pub sha: String,
    pub repo: String,
    pub timestamp: DateTime<FixedOffset>,
    pub parsed: ParsedCommit,
    pub work_mode: WorkMode,
    pub insertions: u32,
    pub deletions: u32,
}

impl WorkUnitCommit {
    /// Parse and classify a raw commit; `None` if its timestamp is unusable
    pub fn from_record(record: &GitCommitRecord) -> Option<Self> {
        let timestamp = parse_timestamp(&record.timestamp)?;
        let parsed = parse_commit_message(&record.message);
        let work_mode = classify_work_mode(&parsed, record.insertions, record.deletions);

        Some(Self {
            sha: record.sha.clone(),
            repo: record.repo.trim().to_string(),
            timestamp,
            parsed,
            work_mode,
            insertions: record.insertions,
            deletions: record.deletions,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// A labeled group of commits forming one coherent piece of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitWorkUnit {
    pub label: String,
    pub work_mode: WorkMode,
    pub commits: Vec<WorkUnitCommit>,
    pub repos: Vec<String>,
    pub time_range: TimeRange,
    pub has_why_information: bool,
    pub why_clause: Option<String>,
    pub is_generic: bool,
}

fn why_patterns() -> &'static [Regex] {
    static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)\bso that\b",
            r"(?i)\bbecause\b",
            r"(?i)\bsince\b",
            r"(?i)\bin order to\b",
            r"(?i)\bto (avoid|prevent|allow|enable|support|ensure)\b",
            r"(?i)\bdue to\b",
            r"(?i)\b(fixes|closes|resolves)\s+#\d+",
        ]
        .into_iter()
        .map(|p| Regex::new(p).expect("Valid why-clause regex"))
        .collect()
    });
    &PATTERNS
}

fn generic_patterns() -> &'static [Regex] {
    static PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?i)^wip\b",
            r"(?i)^(fix|fixes|update|updates|changes|stuff|misc|tmp|temp|test|save|commit|cleanup|typo|tweak|tweaks)$",
            r"(?i)^minor( changes| fixes| updates)?$",
            r"(?i)^(small|quick) (fix|change|update)s?$",
            r"(?i)^work in progress$",
            r"(?i)^[.\-_ ]*$",
            r"(?i)^asdf",
        ]
        .into_iter()
        .map(|p| Regex::new(p).expect("Valid generic message regex"))
        .collect()
    });
    &PATTERNS
}

fn label_word() -> &'static Regex {
    static PATTERN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9_-]+").expect("Valid label word regex"));
    &PATTERN
}

/// First causal clause in the group, scanning patterns in priority order
pub fn extract_why_clause(commits: &[WorkUnitCommit]) -> Option<String> {
    for pattern in why_patterns() {
        for commit in commits {
            if let Some(m) = pattern.find(&commit.parsed.raw) {
                let rest = &commit.parsed.raw[m.start()..];
                let clause = rest.lines().next().unwrap_or(rest).trim();
                return Some(clamp_chars(clause, MAX_WHY_CHARS));
            }
        }
    }
    None
}

/// Whether a single message is a WIP/trivial placeholder
pub fn is_generic_message(message: &str) -> bool {
    let subject = message.lines().next().unwrap_or_default().trim();
    generic_patterns().iter().any(|p| p.is_match(subject))
}

/// Most common work mode; ties go to declaration order
pub fn dominant_work_mode(commits: &[WorkUnitCommit]) -> WorkMode {
    let mut counts: BTreeMap<WorkMode, usize> = BTreeMap::new();
    for commit in commits {
        *counts.entry(commit.work_mode).or_insert(0) += 1;
    }

    let mut best: Option<(WorkMode, usize)> = None;
    for (mode, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((mode, count));
        }
    }
    best.map(|(mode, _)| mode).unwrap_or(WorkMode::Tweaking)
}

/// Up to three most frequent meaningful words across descriptions
fn top_description_words(commits: &[WorkUnitCommit]) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut order = 0;

    for commit in commits {
        for word in label_word().find_iter(&commit.parsed.description) {
            let word = word.as_str().to_lowercase();
            if word.len() < 3
                || Vocabulary::stopwords().contains(word.as_str())
                || Vocabulary::commit_stopwords().contains(word.as_str())
            {
                continue;
            }
            let entry = counts.entry(word).or_insert((0, order));
            entry.0 += 1;
            order += 1;
        }
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0).then(a.1.1.cmp(&b.1.1)));
    ranked.into_iter().take(3).map(|(w, _)| w).collect()
}

/// Label a group by priority: shared scope, single repo, top words, mode
pub fn label_work_unit(commits: &[WorkUnitCommit], repos: &[String], mode: WorkMode) -> String {
    let first_scope = commits.first().and_then(|c| c.parsed.scope.as_deref());
    if let Some(scope) = first_scope {
        if commits
            .iter()
            .all(|c| c.parsed.scope.as_deref() == Some(scope))
        {
            return format!("Feature work: {}", scope);
        }
    }

    if repos.len() == 1 {
        return format!("{}: {}", repos[0], mode);
    }

    let words = top_description_words(commits);
    if !words.is_empty() {
        return words.join(" ");
    }

    mode.to_string()
}

fn build_work_unit(commits: Vec<WorkUnitCommit>) -> Option<CommitWorkUnit> {
    let start = commits.first()?.timestamp;
    let end = commits.last()?.timestamp;

    let mut repos: Vec<String> = Vec::new();
    for commit in &commits {
        if !commit.repo.is_empty() && !repos.contains(&commit.repo) {
            repos.push(commit.repo.clone());
        }
    }

    let work_mode = dominant_work_mode(&commits);
    let label = label_work_unit(&commits, &repos, work_mode);
    let why_clause = extract_why_clause(&commits);
    let is_generic = commits.iter().all(|c| is_generic_message(&c.parsed.raw));

    Some(CommitWorkUnit {
        label,
        work_mode,
        repos,
        time_range: TimeRange { start, end },
        has_why_information: why_clause.is_some(),
        why_clause,
        is_generic,
        commits,
    })
}

/// Segment raw commits into labeled work units
///
/// Commits with unparseable timestamps are skipped. Units come out in
/// chronological order of their first commit.
pub fn extract_work_units(records: &[GitCommitRecord]) -> Vec<CommitWorkUnit> {
    let commits: Vec<WorkUnitCommit> = records
        .iter()
        .filter_map(|record| {
            let commit = WorkUnitCommit::from_record(record);
            if commit.is_none() {
                debug!("Skipping commit {} with unparseable timestamp", record.sha);
            }
            commit
        })
        .collect();

    let units: Vec<CommitWorkUnit> = sessions::segment_sessions(commits)
        .into_iter()
        .flat_map(sessions::group_session)
        .filter_map(build_work_unit)
        .collect();

    debug!(
        "Extracted {} work units from {} commits",
        units.len(),
        records.len()
    );
    units
}
