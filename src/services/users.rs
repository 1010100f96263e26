//! User profile lookups for the detail view.

use crate::client::SearchClient;
use crate::errors::{SearchError, SearchResult};
use crate::notify::{Notifier, NoticeKind, DETAIL_UNAVAILABLE_MESSAGE};
use crate::types::User;
use tracing::warn;

/// What the detail view shows for a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailState {
    /// Profile loaded.
    Loaded(Box<User>),
    /// Profile could not be loaded; the user has been notified.
    Unavailable,
}

impl DetailState {
    /// The loaded profile, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Loaded(user) => Some(user),
            Self::Unavailable => None,
        }
    }
}

/// Service for full user profiles.
#[derive(Debug, Clone)]
pub struct UserDetailService {
    client: SearchClient,
}

impl UserDetailService {
    /// Creates a new user detail service.
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }

    /// Gets a profile by its API URL, as carried in `UserSummary::url`.
    pub async fn fetch(&self, profile_url: &str) -> SearchResult<User> {
        let parsed = url::Url::parse(profile_url).map_err(|e| {
            SearchError::validation(format!("Invalid profile URL {:?}: {}", profile_url, e))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::validation(format!(
                "Profile URL must use http or https, got {:?}",
                parsed.scheme()
            )));
        }

        self.client.get_url(parsed.as_str()).await
    }

    /// Gets a profile by username.
    pub async fn fetch_by_login(&self, login: &str) -> SearchResult<User> {
        if login.trim().is_empty() {
            return Err(SearchError::validation("Login must not be empty"));
        }
        self.client.get(&format!("/users/{}", login.trim())).await
    }

    /// Loads a profile for display, notifying on failure.
    pub async fn load(&self, profile_url: &str, notifier: &dyn Notifier) -> DetailState {
        match self.fetch(profile_url).await {
            Ok(user) => DetailState::Loaded(Box::new(user)),
            Err(e) => {
                warn!(url = %profile_url, error = %e, "Failed to load user profile");
                notifier.notify(NoticeKind::DetailUnavailable, DETAIL_UNAVAILABLE_MESSAGE);
                DetailState::Unavailable
            }
        }
    }
}
