//! User-facing notices.
//!
//! The controller never renders anything itself. Every condition the user has
//! to hear about goes through a [`Notifier`] supplied by the presentation
//! layer.

use crate::errors::{ErrorCategory, SearchError};
use std::fmt;
use tracing::{error, warn};

/// What a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Search submitted without text.
    Validation,
    /// Search quota exhausted.
    RateLimited,
    /// Network or response failure.
    Transport,
    /// Profile for the detail view could not be loaded.
    DetailUnavailable,
}

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user can fix it.
    Warning,
    /// Something failed.
    Error,
}

impl NoticeKind {
    /// Maps an error category to the notice the user sees.
    pub fn from_category(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Validation => Self::Validation,
            ErrorCategory::RateLimited => Self::RateLimited,
            ErrorCategory::Transport => Self::Transport,
        }
    }

    /// Severity of this kind.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Validation => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short title for the notice.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Validation => "Search text is required",
            Self::RateLimited => "Rate-limited",
            Self::Transport => "Search failed",
            Self::DetailUnavailable => "Could not load user",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::Transport => write!(f, "transport"),
            Self::DetailUnavailable => write!(f, "detail_unavailable"),
        }
    }
}

/// Message for an empty submit.
pub const EMPTY_SEARCH_MESSAGE: &str = "Enter something to search";

/// Message for a failure that is not the user's fault.
pub const TRANSPORT_MESSAGE: &str = "Something went wrong while fetching users";

/// Message for a failed profile load.
pub const DETAIL_UNAVAILABLE_MESSAGE: &str = "Couldn't fetch user";

/// Builds the rate limit message, with the cool-down when known.
pub fn rate_limited_message(retry_after: Option<u64>) -> String {
    match retry_after {
        Some(secs) if secs > 0 => format!(
            "Could not fetch user list, try again in {} second{}",
            secs,
            if secs == 1 { "" } else { "s" }
        ),
        _ => "Could not fetch user list, try again in a few seconds".to_string(),
    }
}

/// Builds the notice for a failed fetch.
pub fn notice_for_error(error: &SearchError) -> (NoticeKind, String) {
    let kind = NoticeKind::from_category(error.category());
    let message = match kind {
        NoticeKind::Validation => EMPTY_SEARCH_MESSAGE.to_string(),
        NoticeKind::RateLimited => rate_limited_message(error.retry_after()),
        _ => TRANSPORT_MESSAGE.to_string(),
    };
    (kind, message)
}

/// Receives user-facing notices.
pub trait Notifier: Send + Sync {
    /// Shows a notice to the user.
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Notifier that only writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind.severity() {
            Severity::Warning => warn!(kind = %kind, title = kind.title(), "{}", message),
            Severity::Error => error!(kind = %kind, title = kind.title(), "{}", message),
        }
    }
}
