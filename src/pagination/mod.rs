//! Page state for a user search session.
//!
//! [`PaginationController`] owns the current page, the enabled flag and the
//! displayed results. Every user action is a trigger method that mutates the
//! state synchronously and, when a request is needed, hands back a
//! [`FetchTicket`]. The ticket is run by a [`FetchRunner`] (which holds no
//! borrow of the controller) and the result is handed back to
//! [`PaginationController::complete`]. Results for tickets that are no
//! longer current are dropped there.
//!
//! ```rust,no_run
//! use integrations_github_search::{PaginationController, SearchClient, TracingNotifier};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SearchClient::builder().build()?;
//! let mut controller = PaginationController::from_client(&client, Arc::new(TracingNotifier));
//!
//! controller.on_text_change("octocat");
//! controller.submit().await;
//!
//! if let Some(page) = controller.displayed() {
//!     for user in &page.items {
//!         println!("{}", user.login);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod cache;

pub use cache::PageCache;

use crate::client::SearchClient;
use crate::config::{RetryConfig, DEFAULT_STALE_TIME, MAX_PAGE, PAGE_SIZE};
use crate::errors::{ErrorCategory, SearchResult};
use crate::notify::{notice_for_error, Notifier, NoticeKind, EMPTY_SEARCH_MESSAGE};
use crate::observability::{Metrics, TracingHooks};
use crate::resilience::RetryExecutor;
use crate::services::SearchBackend;
use crate::types::{SearchQuery, SearchUsersResponse, UserSummary};
use std::sync::Arc;
use std::time::Duration;

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// The query that produced this page.
    pub query: SearchQuery,
    /// Users on this page, in upstream order.
    pub items: Vec<UserSummary>,
    /// Total matches upstream.
    pub total_count: u64,
    /// Whether the upstream search timed out before completing.
    pub incomplete_results: bool,
    /// Whether a following page may exist.
    pub has_more: bool,
}

impl SearchPage {
    /// Builds a page from a search response.
    pub fn from_response(query: SearchQuery, response: SearchUsersResponse) -> Self {
        let has_more = query.page() < MAX_PAGE && response.items.len() == PAGE_SIZE as usize;
        Self {
            query,
            items: response.items,
            total_count: response.total_count,
            incomplete_results: response.incomplete_results,
            has_more,
        }
    }

    /// Page number.
    pub fn page(&self) -> u32 {
        self.query.page()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether searching is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// Text is being edited; nothing is fetched.
    Idle,
    /// A search was submitted; paging fetches.
    Enabled,
}

/// Observable pagination state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Current 1-based page, always in `[1, MAX_PAGE]`.
    pub current_page: u32,
    /// Whether searching is armed.
    pub search_enabled: bool,
    /// The last query issued, cached or fetched.
    pub last_query: Option<SearchQuery>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            search_enabled: false,
            last_query: None,
        }
    }
}

/// A fetch the controller is waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: u64,
    query: SearchQuery,
    previous_page: u32,
}

impl FetchTicket {
    /// Ticket identifier, unique per controller.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The query to fetch.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Page shown before the trigger; restored if the fetch fails.
    pub fn previous_page(&self) -> u32 {
        self.previous_page
    }
}

/// Result of a trigger method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Nothing to do: out of bounds, not enabled, or a fetch is in flight.
    Ignored,
    /// Input was invalid; the user has been notified.
    Rejected,
    /// A fresh page was available and is now displayed.
    Cached,
    /// A fetch must be run and handed back to `complete`.
    Fetch(FetchTicket),
}

impl Trigger {
    /// The ticket, if a fetch was issued.
    pub fn ticket(&self) -> Option<&FetchTicket> {
        match self {
            Self::Fetch(ticket) => Some(ticket),
            _ => None,
        }
    }
}

/// What happened to a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page is now displayed.
    Applied,
    /// The fetch failed and the user was notified.
    Failed(ErrorCategory),
    /// The result belonged to an outdated ticket and was dropped.
    Discarded,
    /// A fresh cached page was displayed without fetching.
    Cached,
    /// The trigger did not issue a fetch.
    NotIssued,
}

/// Runs fetch tickets against a backend.
///
/// Cloneable and detached from the controller so that a fetch can be awaited
/// while the controller keeps receiving triggers.
#[derive(Clone)]
pub struct FetchRunner {
    backend: Arc<dyn SearchBackend>,
    retry: RetryExecutor,
}

impl FetchRunner {
    /// Creates a runner.
    pub fn new(backend: Arc<dyn SearchBackend>, retry: &RetryConfig) -> Self {
        Self {
            backend,
            retry: RetryExecutor::new(retry),
        }
    }

    /// Fetches the ticket's page, retrying per the configured policy.
    pub async fn run(&self, ticket: &FetchTicket) -> SearchResult<SearchPage> {
        let backend = &self.backend;
        let query = &ticket.query;
        self.retry.execute(move || backend.fetch(query)).await
    }
}

impl std::fmt::Debug for FetchRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRunner")
            .field("max_attempts", &self.retry.max_attempts())
            .finish_non_exhaustive()
    }
}

/// Page state machine for one search box.
pub struct PaginationController {
    runner: FetchRunner,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<Metrics>,
    state: PaginationState,
    pending_text: String,
    in_flight: Option<u64>,
    next_ticket: u64,
    displayed: Option<SearchPage>,
    cache: PageCache,
}

impl PaginationController {
    /// Creates a controller with no retry and the default staleness window.
    pub fn new(backend: Arc<dyn SearchBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            runner: FetchRunner::new(backend, &RetryConfig::none()),
            notifier,
            metrics: Arc::new(Metrics::new()),
            state: PaginationState::default(),
            pending_text: String::new(),
            in_flight: None,
            next_ticket: 1,
            displayed: None,
            cache: PageCache::new(Some(DEFAULT_STALE_TIME)),
        }
    }

    /// Creates a controller fetching through the client, using its retry
    /// policy, staleness window and counters.
    pub fn from_client(client: &SearchClient, notifier: Arc<dyn Notifier>) -> Self {
        let config = client.config();
        Self::new(Arc::new(client.search_fetcher()), notifier)
            .with_retry(&config.retry)
            .with_stale_time(config.stale_time)
            .with_metrics(client.metrics())
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: &RetryConfig) -> Self {
        self.runner = FetchRunner::new(self.runner.backend.clone(), retry);
        self
    }

    /// Sets the staleness window; `None` disables reuse.
    pub fn with_stale_time(mut self, stale_time: Option<Duration>) -> Self {
        self.cache = PageCache::new(stale_time);
        self
    }

    /// Shares an existing counter set.
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Current state.
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> ControllerPhase {
        if self.state.search_enabled {
            ControllerPhase::Enabled
        } else {
            ControllerPhase::Idle
        }
    }

    /// The page being shown, if any.
    pub fn displayed(&self) -> Option<&SearchPage> {
        self.displayed.as_ref()
    }

    /// Text in the search box.
    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    /// Returns true while a fetch is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Counters.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// A runner for tickets issued by this controller.
    pub fn runner(&self) -> FetchRunner {
        self.runner.clone()
    }

    /// Returns true if a forward trigger would do something.
    pub fn can_page_forward(&self) -> bool {
        self.state.search_enabled
            && self.state.current_page < MAX_PAGE
            && self.displayed.as_ref().map_or(false, |p| p.len() == PAGE_SIZE as usize)
    }

    /// Returns true if a back trigger would do something.
    pub fn can_page_back(&self) -> bool {
        self.state.search_enabled && self.state.current_page > 1
    }

    /// The search text changed.
    ///
    /// Disarms searching, resets to page 1, clears the displayed results and
    /// invalidates any outstanding fetch. Never fetches.
    pub fn on_text_change(&mut self, text: impl Into<String>) {
        self.pending_text = text.into();
        self.state.search_enabled = false;
        self.state.current_page = 1;
        self.displayed = None;
        self.in_flight = None;
    }

    /// The search was submitted.
    pub fn on_submit(&mut self) -> Trigger {
        if self.pending_text.trim().is_empty() {
            self.notifier.notify(NoticeKind::Validation, EMPTY_SEARCH_MESSAGE);
            return Trigger::Rejected;
        }
        if self.in_flight.is_some() {
            return Trigger::Ignored;
        }

        let previous_page = self.state.current_page;
        self.state.search_enabled = true;
        self.state.current_page = 1;
        self.issue(previous_page)
    }

    /// Back one page.
    pub fn on_page_back(&mut self) -> Trigger {
        if !self.can_page_back() || self.in_flight.is_some() {
            return Trigger::Ignored;
        }

        let previous_page = self.state.current_page;
        self.state.current_page -= 1;
        self.issue(previous_page)
    }

    /// Forward one page.
    pub fn on_page_forward(&mut self) -> Trigger {
        if !self.can_page_forward() || self.in_flight.is_some() {
            return Trigger::Ignored;
        }

        let previous_page = self.state.current_page;
        self.state.current_page += 1;
        self.issue(previous_page)
    }

    /// Applies the result of a ticket.
    pub fn complete(&mut self, ticket: FetchTicket, result: SearchResult<SearchPage>) -> FetchOutcome {
        // Text changes clear `in_flight`, so the in-flight ticket always matches the pending text.
        if self.in_flight != Some(ticket.id) {
            return self.discard(&ticket, "superseded");
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.cache.insert(page.clone());
                self.displayed = Some(page);
                FetchOutcome::Applied
            }
            Err(e) => {
                let category = e.category();
                if category != ErrorCategory::Validation {
                    self.state.current_page = ticket.previous_page;
                }
                let (kind, message) = notice_for_error(&e);
                self.notifier.notify(kind, &message);
                FetchOutcome::Failed(category)
            }
        }
    }

    /// Submits and waits for the result.
    pub async fn submit(&mut self) -> FetchOutcome {
        let trigger = self.on_submit();
        self.drive(trigger).await
    }

    /// Pages forward and waits for the result.
    pub async fn page_forward(&mut self) -> FetchOutcome {
        let trigger = self.on_page_forward();
        self.drive(trigger).await
    }

    /// Pages back and waits for the result.
    pub async fn page_back(&mut self) -> FetchOutcome {
        let trigger = self.on_page_back();
        self.drive(trigger).await
    }

    async fn drive(&mut self, trigger: Trigger) -> FetchOutcome {
        match trigger {
            Trigger::Fetch(ticket) => {
                let result = self.runner.run(&ticket).await;
                self.complete(ticket, result)
            }
            Trigger::Cached => FetchOutcome::Cached,
            Trigger::Ignored | Trigger::Rejected => FetchOutcome::NotIssued,
        }
    }

    fn issue(&mut self, previous_page: u32) -> Trigger {
        let query = SearchQuery::new(self.pending_text.clone(), self.state.current_page);
        self.state.last_query = Some(query.clone());

        if let Some(page) = self.cache.get(&query) {
            TracingHooks::on_cache_hit(&query);
            self.metrics.record_cache_hit();
            self.displayed = Some(page);
            return Trigger::Cached;
        }

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);

        Trigger::Fetch(FetchTicket {
            id,
            query,
            previous_page,
        })
    }

    fn discard(&self, ticket: &FetchTicket, reason: &str) -> FetchOutcome {
        TracingHooks::on_result_discarded(&ticket.query, reason);
        self.metrics.record_discarded();
        FetchOutcome::Discarded
    }
}

impl std::fmt::Debug for PaginationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("state", &self.state)
            .field("pending_text", &self.pending_text)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}
