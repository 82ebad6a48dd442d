//! Session segmentation and grouping
//!
//! A session ends when the next commit is more than 90 minutes later or falls
//! on another calendar day. Inside a session commits are grouped by
//! repository, and debugging commits get a group of their own so a bug hunt
//! doesn't blur the feature narrative around it.

use super::work_mode::WorkMode;
use super::WorkUnitCommit;
use chrono::Duration;

/// Longest gap between consecutive commits of one session
pub const SESSION_GAP_MINUTES: i64 = 90;

/// Whether `next` starts a new session after `prev`
pub fn is_session_break(prev: &WorkUnitCommit, next: &WorkUnitCommit) -> bool {
    let gap = next.timestamp - prev.timestamp;
    gap > Duration::minutes(SESSION_GAP_MINUTES)
        || prev.timestamp.date_naive() != next.timestamp.date_naive()
}

/// Sort commits chronologically and cut them into sessions
pub fn segment_sessions(mut commits: Vec<WorkUnitCommit>) -> Vec<Vec<WorkUnitCommit>> {
    commits.sort_by_key(|c| c.timestamp);

    let mut sessions: Vec<Vec<WorkUnitCommit>> = Vec::new();
    for commit in commits {
        match sessions.last_mut() {
            Some(current)
                if current
                    .last()
                    .is_some_and(|prev| !is_session_break(prev, &commit)) =>
            {
                current.push(commit);
            }
            _ => sessions.push(vec![commit]),
        }
    }
    sessions
}

/// Split one session into repo groups, with debugging commits separated
pub fn group_session(session: Vec<WorkUnitCommit>) -> Vec<Vec<WorkUnitCommit>> {
    let mut repos: Vec<String> = Vec::new();
    for commit in &session {
        if !repos.contains(&commit.repo) {
            repos.push(commit.repo.clone());
        }
    }

    let mut groups: Vec<Vec<WorkUnitCommit>> = Vec::new();
    for repo in repos {
        let (debugging, other): (Vec<_>, Vec<_>) = session
            .iter()
            .filter(|c| c.repo == repo)
            .cloned()
            .partition(|c| c.work_mode == WorkMode::Debugging);

        groups.extend([other, debugging].into_iter().filter(|g| !g.is_empty()));
    }

    groups.sort_by_key(|g| g[0].timestamp);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commits::parse::parse_commit_message;
    use chrono::DateTime;

    fn commit(repo: &str, ts: &str, message: &str, mode: WorkMode) -> WorkUnitCommit {
        WorkUnitCommit {
            sha: format!("{}-{}", repo, ts),
            repo: repo.to_string(),
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            parsed: parse_commit_message(message),
            work_mode: mode,
            insertions: 1,
            deletions: 0,
        }
    }

    #[test]
    fn test_gap_of_91_minutes_splits() {
        let sessions = segment_sessions(vec![
            commit("a", "2026-03-02T10:00:00Z", "one", WorkMode::Building),
            commit("a", "2026-03-02T11:31:00Z", "two", WorkMode::Building),
        ]);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_gap_of_89_minutes_stays() {
        let sessions = segment_sessions(vec![
            commit("a", "2026-03-02T10:00:00Z", "one", WorkMode::Building),
            commit("a", "2026-03-02T11:29:00Z", "two", WorkMode::Building),
        ]);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_midnight_splits() {
        let sessions = segment_sessions(vec![
            commit("a", "2026-03-02T23:55:00Z", "one", WorkMode::Building),
            commit("a", "2026-03-03T00:05:00Z", "two", WorkMode::Building),
        ]);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let sessions = segment_sessions(vec![
            commit("a", "2026-03-02T11:00:00Z", "late", WorkMode::Building),
            commit("a", "2026-03-02T10:00:00Z", "early", WorkMode::Building),
        ]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0][0].parsed.description, "early");
    }

    #[test]
    fn test_debugging_split_from_feature_work() {
        let groups = group_session(vec![
            commit("api", "2026-03-02T10:00:00Z", "feat: a", WorkMode::Building),
            commit("api", "2026-03-02T10:10:00Z", "fix: b", WorkMode::Debugging),
            commit("web", "2026-03-02T10:20:00Z", "feat: c", WorkMode::Building),
            commit("api", "2026-03-02T10:30:00Z", "feat: d", WorkMode::Building),
        ]);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].len(), 2); // api feature work
        assert!(groups[0].iter().all(|c| c.work_mode == WorkMode::Building));
        assert_eq!(groups[1][0].parsed.description, "b"); // api debugging
        assert_eq!(groups[2][0].repo, "web");
    }
}
