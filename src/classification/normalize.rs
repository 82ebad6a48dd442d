//! Upstream record → [`RawActivityEvent`] normalization
//!
//! Collectors hand over already-sanitized, already-categorized records. Each
//! source gets a `text` projection the classifiers work from:
//! - browser visit: `"{domain} - {title}"`
//! - search query: the query itself
//! - AI session: the full prompt
//! - commit: `"{repo}: {first line of message}"`

use crate::types::{ActivitySource, RawActivityEvent};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserVisit {
    pub url: String,
    pub title: String,
    /// Falls back to the host parsed from `url`
    #[serde(default)]
    pub domain: Option<String>,
    /// RFC 3339
    pub timestamp: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub visit_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    #[serde(default)]
    pub engine: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSession {
    pub prompt: String,
    /// Assistant name, e.g. "claude-code"
    #[serde(default)]
    pub tool: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitCommitRecord {
    pub sha: String,
    pub message: String,
    pub repo: String,
    pub timestamp: String,
    #[serde(default)]
    pub insertions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub files_changed: u32,
}

/// Parse an upstream timestamp; anything unparseable becomes `None`
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed).ok()
}

/// Host part of a URL without scheme, credentials, port, or `www.`
pub fn domain_from_url(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host_port = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = host_port.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

pub fn from_browser_visit(visit: &BrowserVisit) -> RawActivityEvent {
    let domain = visit
        .domain
        .as_deref()
        .map(|d| d.trim().trim_start_matches("www.").to_lowercase())
        .filter(|d| !d.is_empty())
        .or_else(|| domain_from_url(&visit.url))
        .unwrap_or_default();

    let title = visit.title.trim();
    let text = match (domain.is_empty(), title.is_empty()) {
        (false, false) => format!("{} - {}", domain, title),
        (false, true) => domain.clone(),
        (true, _) => title.to_string(),
    };

    let mut event = RawActivityEvent::new(
        parse_timestamp(&visit.timestamp),
        ActivitySource::Browser,
        text,
    )
    .with_metadata("url", visit.url.clone());
    event.category = visit.category.clone();

    if !domain.is_empty() {
        event = event.with_metadata("domain", domain);
    }
    if let Some(count) = visit.visit_count {
        event = event.with_metadata("visit_count", count.to_string());
    }
    event
}

pub fn from_search_query(search: &SearchQuery) -> RawActivityEvent {
    let mut event = RawActivityEvent::new(
        parse_timestamp(&search.timestamp),
        ActivitySource::Search,
        search.query.trim(),
    );
    event.category = search.category.clone();
    if let Some(engine) = &search.engine {
        event = event.with_metadata("engine", engine.clone());
    }
    event
}

pub fn from_ai_session(session: &AiSession) -> RawActivityEvent {
    let mut event = RawActivityEvent::new(
        parse_timestamp(&session.timestamp),
        ActivitySource::AiAssistant,
        session.prompt.trim(),
    )
    .with_category("ai_tools");

    if let Some(tool) = &session.tool {
        event = event.with_metadata("tool", tool.clone());
    }
    if let Some(project) = &session.project {
        event = event.with_metadata("project", project.clone());
    }
    event
}

pub fn from_git_commit(commit: &GitCommitRecord) -> RawActivityEvent {
    let subject = commit.message.lines().next().unwrap_or_default().trim();
    RawActivityEvent::new(
        parse_timestamp(&commit.timestamp),
        ActivitySource::Commit,
        format!("{}: {}", commit.repo, subject),
    )
    .with_category("dev")
    .with_metadata("repo", commit.repo.clone())
    .with_metadata("sha", commit.sha.clone())
    .with_metadata("message", commit.message.clone())
    .with_metadata("insertions", commit.insertions.to_string())
    .with_metadata("deletions", commit.deletions.to_string())
}

/// All upstream records for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityBundle {
    #[serde(default)]
    pub browser_visits: Vec<BrowserVisit>,
    #[serde(default)]
    pub searches: Vec<SearchQuery>,
    #[serde(default)]
    pub ai_sessions: Vec<AiSession>,
    #[serde(default)]
    pub commits: Vec<GitCommitRecord>,
}

impl ActivityBundle {
    /// Normalize every record, sources in a fixed order and each source in input order
    pub fn to_raw_events(&self) -> Vec<RawActivityEvent> {
        self.browser_visits
            .iter()
            .map(from_browser_visit)
            .chain(self.searches.iter().map(from_search_query))
            .chain(self.ai_sessions.iter().map(from_ai_session))
            .chain(self.commits.iter().map(from_git_commit))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(url: &str, title: &str) -> BrowserVisit {
        BrowserVisit {
            url: url.to_string(),
            title: title.to_string(),
            domain: None,
            timestamp: "2026-03-02T09:15:00Z".to_string(),
            category: Some("dev".to_string()),
            visit_count: Some(2),
        }
    }

    #[test]
    fn test_domain_from_url() {
        assert_eq!(
            domain_from_url("https://www.github.com/rust-lang/rust?tab=issues"),
            Some("github.com".to_string())
        );
        assert_eq!(
            domain_from_url("http://user:pw@localhost:8080/x"),
            Some("localhost".to_string())
        );
        assert_eq!(domain_from_url(""), None);
    }

    #[test]
    fn test_browser_text_projection() {
        let event = from_browser_visit(&visit("https://docs.rs/tokio", "tokio - Rust"));
        assert_eq!(event.text, "docs.rs - tokio - Rust");
        assert_eq!(event.source, ActivitySource::Browser);
        assert_eq!(event.category.as_deref(), Some("dev"));
        assert_eq!(event.metadata_value("domain"), Some("docs.rs"));
        assert_eq!(event.metadata_value("visit_count"), Some("2"));
        assert!(event.timestamp.is_some());
    }

    #[test]
    fn test_invalid_timestamp_is_none() {
        let mut v = visit("https://example.com", "Example");
        v.timestamp = "yesterday-ish".to_string();
        assert!(from_browser_visit(&v).timestamp.is_none());

        v.timestamp = String::new();
        assert!(from_browser_visit(&v).timestamp.is_none());
    }

    #[test]
    fn test_commit_projection_uses_subject() {
        let event = from_git_commit(&GitCommitRecord {
            sha: "abc123".to_string(),
            message: "feat(auth): add token refresh\n\nLonger body".to_string(),
            repo: "webapp".to_string(),
            timestamp: "2026-03-02T14:00:00+01:00".to_string(),
            insertions: 40,
            deletions: 2,
            files_changed: 3,
        });
        assert_eq!(event.text, "webapp: feat(auth): add token refresh");
        assert_eq!(event.metadata_value("insertions"), Some("40"));
    }

    #[test]
    fn test_bundle_order() {
        let bundle = ActivityBundle {
            browser_visits: vec![visit("https://a.dev", "A")],
            searches: vec![SearchQuery {
                query: "rust lifetimes".to_string(),
                engine: Some("kagi".to_string()),
                timestamp: "2026-03-02T08:00:00Z".to_string(),
                category: None,
            }],
            ai_sessions: vec![AiSession {
                prompt: "why does this panic".to_string(),
                tool: None,
                timestamp: "2026-03-02T10:00:00Z".to_string(),
                project: None,
            }],
            commits: vec![],
        };

        let sources: Vec<_> = bundle.to_raw_events().iter().map(|e| e.source).collect();
        assert_eq!(
            sources,
            vec![
                ActivitySource::Browser,
                ActivitySource::Search,
                ActivitySource::AiAssistant
            ]
        );
    }
}
