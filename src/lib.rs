//! # GitHub User Search
//!
//! The data-fetching core behind a GitHub user search box:
//! - Pre-flight rate limit check against the search quota (fails closed)
//! - Single-page user search with normalized errors
//! - A pagination state machine with page bounds, stale-result discarding
//!   and user notices
//! - Profile lookups for the detail view
//! - Optional caller-side retry and a short-lived page cache
//!
//! Rendering is left to the caller: it reads the displayed page and the
//! pagination state, and receives notices through a [`Notifier`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_github_search::{PaginationController, SearchClient, TracingNotifier};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SearchClient::builder()
//!         .user_agent("my-app/1.0")
//!         .build()?;
//!
//!     let mut search = PaginationController::from_client(&client, Arc::new(TracingNotifier));
//!
//!     search.on_text_change("octocat");
//!     search.submit().await;
//!
//!     if let Some(page) = search.displayed() {
//!         for user in &page.items {
//!             println!("{}", user.login);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;
pub mod types;

// HTTP client and transport
pub mod client;

// API Services
pub mod services;

// Page state
pub mod pagination;

// Resilience patterns
pub mod resilience;

// User notices
pub mod notify;

// Observability
pub mod observability;

// Mocks for testing
pub mod mocks;

// Re-exports for convenience
pub use client::{SearchClient, SearchClientBuilder};
pub use config::{RetryConfig, SearchConfig, SearchConfigBuilder, MAX_PAGE, PAGE_SIZE};
pub use errors::{ErrorCategory, SearchError, SearchErrorKind, SearchResult};
pub use notify::{NoticeKind, Notifier, TracingNotifier};
pub use pagination::{
    ControllerPhase, FetchOutcome, FetchRunner, FetchTicket, PaginationController, PaginationState,
    SearchPage, Trigger,
};
pub use services::{DetailState, RateLimitGate, SearchBackend, SearchFetcher, UserDetailService};
pub use types::*;
