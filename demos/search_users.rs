//! Searches GitHub users by login and walks the first pages of results.
//!
//! ```sh
//! cargo run --example search_users -- octocat
//! ```

use anyhow::Context;
use integrations_github_search::{
    FetchOutcome, NoticeKind, Notifier, PaginationController, SearchClient,
};
use std::sync::Arc;

/// Prints notices the way a status line would.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        eprintln!("[{}] {}: {}", kind, kind.title(), message);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let text = std::env::args().nth(1).unwrap_or_else(|| "octocat".to_string());

    let client = SearchClient::builder()
        .user_agent("integrations-github-search-demo/0.1.0")
        .build()
        .context("Failed to build client")?;

    let notifier = Arc::new(ConsoleNotifier);
    let mut search = PaginationController::from_client(&client, notifier.clone());

    search.on_text_change(text);
    let mut outcome = search.submit().await;

    while matches!(outcome, FetchOutcome::Applied | FetchOutcome::Cached) {
        if let Some(page) = search.displayed() {
            println!("Page {} ({} total matches)", page.page(), page.total_count);
            for user in &page.items {
                println!("  {:<24} {}", user.login, user.html_url);
            }
        }
        if search.state().current_page >= 3 {
            break;
        }
        outcome = search.page_forward().await;
    }

    let first = search.displayed().and_then(|page| page.items.first().cloned());
    if let Some(summary) = first {
        let state = client.user_details().load(&summary.url, notifier.as_ref()).await;
        if let Some(user) = state.user() {
            println!();
            println!("{} ({})", user.display_name(), user.login);
            if let Some(location) = user.location() {
                println!("  Location: {}", location);
            }
            if let Some(blog) = user.blog_url() {
                println!("  Blog:     {}", blog);
            }
            if let Some(twitter) = user.twitter_url() {
                println!("  Twitter:  {}", twitter);
            }
            println!("  Repos: {}  Followers: {}", user.public_repos, user.followers);
        }
    }

    let metrics = client.metrics().snapshot();
    println!();
    println!(
        "Fetches: {} ok, {} failed, {} rate limited, {} cached",
        metrics.fetches_success, metrics.fetches_failed, metrics.fetches_rate_limited, metrics.cache_hits
    );

    Ok(())
}
