//! Core data types for the GitHub search API.

use crate::config::MAX_PAGE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A search request for one page of users.
///
/// Immutable once issued; build a new one to change the text or page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    text: String,
    page: u32,
}

impl SearchQuery {
    /// Creates a query for the given text and 1-based page.
    pub fn new(text: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            page,
        }
    }

    /// Creates a query for the first page.
    pub fn first_page(text: impl Into<String>) -> Self {
        Self::new(text, 1)
    }

    /// The free-text search term.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The 1-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns true if the text is non-blank and the page is in range.
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && (1..=MAX_PAGE).contains(&self.page)
    }
}

/// A user as returned by the search endpoint.
///
/// Fields are passed through from the API untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Username (login).
    pub login: String,
    /// User ID.
    pub id: u64,
    /// User node ID.
    #[serde(default)]
    pub node_id: String,
    /// Avatar URL.
    pub avatar_url: String,
    /// API URL of the full profile.
    pub url: String,
    /// Profile page URL.
    pub html_url: String,
    /// User type (User, Organization, Bot).
    #[serde(rename = "type", default)]
    pub user_type: String,
    /// Site admin flag.
    #[serde(default)]
    pub site_admin: bool,
}

/// Body of `GET /search/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    /// Total matches upstream, not limited by the result window.
    pub total_count: u64,
    /// Whether the search timed out upstream before completing.
    #[serde(default)]
    pub incomplete_results: bool,
    /// Matching users.
    pub items: Vec<UserSummary>,
}

/// Quota for one rate limit category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    /// Requests allowed per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Window reset as a Unix timestamp.
    #[serde(rename = "reset")]
    pub reset_epoch_seconds: i64,
}

impl RateLimitStatus {
    /// Returns true if no request is left in the current window.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Window reset as a timestamp.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset_epoch_seconds, 0)
    }
}

/// Per-category quotas in a rate limit response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResources {
    /// Core REST quota.
    pub core: Option<RateLimitStatus>,
    /// Search quota.
    pub search: RateLimitStatus,
    /// GraphQL quota.
    pub graphql: Option<RateLimitStatus>,
}

/// Body of `GET /rate_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResponse {
    /// Quotas per category.
    pub resources: RateLimitResources,
    /// Deprecated mirror of the core quota.
    pub rate: Option<RateLimitStatus>,
}

/// Full user profile shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Username (login).
    pub login: String,
    /// User ID.
    pub id: u64,
    /// Avatar URL.
    pub avatar_url: String,
    /// Profile page URL.
    pub html_url: String,
    /// Display name.
    pub name: Option<String>,
    /// Company.
    pub company: Option<String>,
    /// Blog URL.
    pub blog: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// Public email.
    pub email: Option<String>,
    /// Hireable flag.
    pub hireable: Option<bool>,
    /// Bio.
    pub bio: Option<String>,
    /// Twitter username.
    pub twitter_username: Option<String>,
    /// Public repos count.
    #[serde(default)]
    pub public_repos: u32,
    /// Public gists count.
    #[serde(default)]
    pub public_gists: u32,
    /// Followers count.
    #[serde(default)]
    pub followers: u32,
    /// Following count.
    #[serde(default)]
    pub following: u32,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Link to the user's Twitter profile.
    pub fn twitter_url(&self) -> Option<String> {
        non_blank(&self.twitter_username).map(|name| format!("https://twitter.com/{}", name))
    }

    /// Blog URL, if set. The API reports a missing blog as an empty string.
    pub fn blog_url(&self) -> Option<&str> {
        non_blank(&self.blog)
    }

    /// Location, if set.
    pub fn location(&self) -> Option<&str> {
        non_blank(&self.location)
    }

    /// Display name, falling back to the login.
    pub fn display_name(&self) -> &str {
        non_blank(&self.name).unwrap_or(&self.login)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_validity() {
        assert!(SearchQuery::first_page("octocat").is_valid());
        assert!(!SearchQuery::first_page("").is_valid());
        assert!(!SearchQuery::first_page("   ").is_valid());
        assert!(!SearchQuery::new("octocat", 0).is_valid());
        assert!(!SearchQuery::new("octocat", MAX_PAGE + 1).is_valid());
        assert!(SearchQuery::new("octocat", MAX_PAGE).is_valid());
    }

    #[test]
    fn test_deserialize_search_response() {
        let json = r#"{
            "total_count": 1,
            "incomplete_results": false,
            "items": [{
                "login": "octocat",
                "id": 1,
                "node_id": "MDQ6VXNlcjE=",
                "avatar_url": "https://github.com/images/error/octocat_happy.gif",
                "gravatar_id": "",
                "url": "https://api.github.com/users/octocat",
                "html_url": "https://github.com/octocat",
                "type": "User",
                "site_admin": false,
                "score": 1.0
            }]
        }"#;

        let response: SearchUsersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_count, 1);
        assert_eq!(response.items[0].login, "octocat");
        assert_eq!(response.items[0].user_type, "User");
    }

    #[test]
    fn test_deserialize_rate_limit() {
        let json = r#"{
            "resources": {
                "core": {"limit": 60, "remaining": 59, "reset": 1700000000, "used": 1},
                "search": {"limit": 10, "remaining": 0, "reset": 1700000060, "used": 10},
                "graphql": {"limit": 0, "remaining": 0, "reset": 1700000000, "used": 0}
            },
            "rate": {"limit": 60, "remaining": 59, "reset": 1700000000, "used": 1}
        }"#;

        let response: RateLimitResponse = serde_json::from_str(json).unwrap();
        assert!(response.resources.search.is_exhausted());
        assert_eq!(response.resources.search.reset_epoch_seconds, 1700000060);
        assert!(response.resources.search.reset_at().is_some());
    }

    #[test]
    fn test_user_helpers() {
        let user: User = serde_json::from_str(
            r#"{
                "login": "octocat",
                "id": 1,
                "avatar_url": "https://github.com/images/error/octocat_happy.gif",
                "html_url": "https://github.com/octocat",
                "name": "",
                "company": "@github",
                "blog": "",
                "location": "San Francisco",
                "email": null,
                "hireable": null,
                "bio": null,
                "twitter_username": "octocat",
                "public_repos": 8,
                "public_gists": 8,
                "followers": 20,
                "following": 0,
                "created_at": "2011-01-25T18:44:36Z",
                "updated_at": "2024-01-22T12:00:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(user.twitter_url().as_deref(), Some("https://twitter.com/octocat"));
        assert_eq!(user.blog_url(), None);
        assert_eq!(user.location(), Some("San Francisco"));
        assert_eq!(user.display_name(), "octocat");
    }
}
