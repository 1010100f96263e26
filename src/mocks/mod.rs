//! Test doubles for the search stack.

use crate::config::PAGE_SIZE;
use crate::errors::{SearchError, SearchResult};
use crate::notify::{NoticeKind, Notifier};
use crate::pagination::SearchPage;
use crate::services::SearchBackend;
use crate::types::*;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

/// Search backend answering from a queue of canned replies.
///
/// Each fetch pops one reply: a number of users to return or an error. With
/// an empty queue the fetch fails as a transport error.
#[derive(Debug, Clone, Default)]
pub struct MockSearchBackend {
    /// Queued replies.
    replies: Arc<RwLock<VecDeque<SearchResult<usize>>>>,
    /// Request history.
    requests: Arc<RwLock<Vec<SearchQuery>>>,
}

impl MockSearchBackend {
    /// Creates a backend with no queued replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a page with `count` users.
    pub fn push_users(&self, count: usize) {
        if let Ok(mut replies) = self.replies.write() {
            replies.push_back(Ok(count));
        }
    }

    /// Queues a full page.
    pub fn push_full_page(&self) {
        self.push_users(PAGE_SIZE as usize);
    }

    /// Queues an error.
    pub fn push_error(&self, error: SearchError) {
        if let Ok(mut replies) = self.replies.write() {
            replies.push_back(Err(error));
        }
    }

    /// Gets all queries fetched so far.
    pub fn requests(&self) -> Vec<SearchQuery> {
        self.requests.read().map(|r| r.clone()).unwrap_or_default()
    }

    /// Gets the number of fetches.
    pub fn request_count(&self) -> usize {
        self.requests.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Clears queued replies and history.
    pub fn reset(&self) {
        if let Ok(mut replies) = self.replies.write() {
            replies.clear();
        }
        if let Ok(mut requests) = self.requests.write() {
            requests.clear();
        }
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn fetch(&self, query: &SearchQuery) -> SearchResult<SearchPage> {
        if let Ok(mut requests) = self.requests.write() {
            requests.push(query.clone());
        }

        let reply = self
            .replies
            .write()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Err(SearchError::transport("No mock reply queued")));

        reply.map(|count| {
            let offset = (query.page().saturating_sub(1) * PAGE_SIZE) as u64;
            SearchPage::from_response(query.clone(), fixtures::search_response_from(offset, count))
        })
    }
}

/// Notifier that keeps every notice.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<RwLock<Vec<(NoticeKind, String)>>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets all notices in order.
    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.read().map(|n| n.clone()).unwrap_or_default()
    }

    /// Gets the kinds of all notices in order.
    pub fn kinds(&self) -> Vec<NoticeKind> {
        self.notices().into_iter().map(|(kind, _)| kind).collect()
    }

    /// Returns true if nothing was notified.
    pub fn is_empty(&self) -> bool {
        self.notices.read().map(|n| n.is_empty()).unwrap_or(true)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        if let Ok(mut notices) = self.notices.write() {
            notices.push((kind, message.to_string()));
        }
    }
}

/// Test data.
pub mod fixtures {
    use super::*;
    use serde_json::{json, Value};

    /// Creates a search result entry.
    pub fn user_summary(login: &str, id: u64) -> UserSummary {
        UserSummary {
            login: login.to_string(),
            id,
            node_id: format!("MDQ6VXNlcj{}", id),
            avatar_url: format!("https://avatars.githubusercontent.com/u/{}?v=4", id),
            url: format!("https://api.github.com/users/{}", login),
            html_url: format!("https://github.com/{}", login),
            user_type: "User".to_string(),
            site_admin: false,
        }
    }

    /// Creates a search response with `count` users.
    pub fn search_response(count: usize) -> SearchUsersResponse {
        search_response_from(0, count)
    }

    /// Creates a search response with `count` users numbered after `offset`.
    pub fn search_response_from(offset: u64, count: usize) -> SearchUsersResponse {
        let items = (1..=count as u64)
            .map(|i| user_summary(&format!("user{}", offset + i), offset + i))
            .collect();
        SearchUsersResponse {
            total_count: 1000,
            incomplete_results: false,
            items,
        }
    }

    /// JSON body of `GET /search/users` with `count` users.
    pub fn search_response_json(count: usize) -> Value {
        serde_json::to_value(search_response(count)).unwrap_or(Value::Null)
    }

    /// JSON body of `GET /rate_limit` with the given search quota left.
    pub fn rate_limit_json(remaining: u32) -> Value {
        json!({
            "resources": {
                "core": {"limit": 60, "remaining": 60, "reset": 1_700_003_600, "used": 0},
                "search": {"limit": 10, "remaining": remaining, "reset": 1_700_000_060, "used": 10 - remaining.min(10)},
                "graphql": {"limit": 0, "remaining": 0, "reset": 1_700_003_600, "used": 0}
            },
            "rate": {"limit": 60, "remaining": 60, "reset": 1_700_003_600, "used": 0}
        })
    }

    /// Creates a full profile.
    pub fn user(login: &str) -> User {
        User {
            login: login.to_string(),
            id: 1,
            avatar_url: "https://avatars.githubusercontent.com/u/1?v=4".to_string(),
            html_url: format!("https://github.com/{}", login),
            name: Some("The Octocat".to_string()),
            company: Some("@github".to_string()),
            blog: Some("https://github.blog".to_string()),
            location: Some("San Francisco".to_string()),
            email: None,
            hireable: None,
            bio: None,
            twitter_username: Some(login.to_string()),
            public_repos: 8,
            public_gists: 8,
            followers: 20,
            following: 0,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_replies_in_order() {
        let backend = MockSearchBackend::new();
        backend.push_full_page();
        backend.push_error(SearchError::rate_limited("quota"));

        let first = backend.fetch(&SearchQuery::new("octocat", 2)).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first.items[0].login, "user11");
        assert!(first.has_more);

        let second = backend.fetch(&SearchQuery::new("octocat", 3)).await;
        assert!(second.is_err());

        let third = backend.fetch(&SearchQuery::new("octocat", 3)).await;
        assert!(third.is_err());
        assert_eq!(backend.request_count(), 3);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        assert!(notifier.is_empty());

        notifier.notify(NoticeKind::Transport, "failed");

        assert_eq!(notifier.notices(), vec![(NoticeKind::Transport, "failed".to_string())]);
    }

    #[test]
    fn test_fixtures() {
        let response: SearchUsersResponse =
            serde_json::from_value(fixtures::search_response_json(3)).unwrap();
        assert_eq!(response.items.len(), 3);

        let rate: RateLimitResponse = serde_json::from_value(fixtures::rate_limit_json(0)).unwrap();
        assert!(rate.resources.search.is_exhausted());

        assert_eq!(fixtures::user("octocat").display_name(), "The Octocat");
    }
}
