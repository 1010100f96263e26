//! Integration tests for the pagination controller.

mod common;

use common::{client_for, mount_rate_limit};
use integrations_github_search::mocks::{fixtures, MockSearchBackend, RecordingNotifier};
use integrations_github_search::notify::EMPTY_SEARCH_MESSAGE;
use integrations_github_search::{
    ControllerPhase, ErrorCategory, FetchOutcome, NoticeKind, Notifier, PaginationController,
    PaginationState, SearchError, SearchQuery, Trigger, MAX_PAGE,
};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mock! {
    pub Notices {}

    impl Notifier for Notices {
        fn notify(&self, kind: NoticeKind, message: &str);
    }
}

fn controller_with(backend: &MockSearchBackend) -> (PaginationController, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let controller =
        PaginationController::new(Arc::new(backend.clone()), Arc::new(notifier.clone())).with_stale_time(None);
    (controller, notifier)
}

/// Submits "octocat" and pages forward until `page`, each page full.
async fn advance_to(controller: &mut PaginationController, backend: &MockSearchBackend, page: u32) {
    controller.on_text_change("octocat");
    backend.push_full_page();
    assert_eq!(controller.submit().await, FetchOutcome::Applied);

    for _ in 1..page {
        backend.push_full_page();
        assert_eq!(controller.page_forward().await, FetchOutcome::Applied);
    }
    assert_eq!(controller.state().current_page, page);
}

#[tokio::test]
async fn test_submit_resets_to_first_page() {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    advance_to(&mut controller, &backend, 3).await;

    backend.reset();
    backend.push_users(4);
    controller.on_text_change("tom");
    assert_eq!(controller.submit().await, FetchOutcome::Applied);

    assert_eq!(controller.state().current_page, 1);
    assert_eq!(backend.requests(), vec![SearchQuery::first_page("tom")]);
}

#[test_case(1 ; "from first page")]
#[test_case(2 ; "from second page")]
#[test_case(50 ; "from middle page")]
#[test_case(99 ; "from last but one page")]
#[tokio::test]
async fn test_forward_after_full_page(start: u32) {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    advance_to(&mut controller, &backend, start).await;

    backend.push_users(3);
    assert_eq!(controller.page_forward().await, FetchOutcome::Applied);
    assert_eq!(controller.state().current_page, start + 1);
}

#[test_case(1 ; "from first page")]
#[test_case(7 ; "from later page")]
#[tokio::test]
async fn test_forward_after_short_page_is_noop(start: u32) {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    controller.on_text_change("octocat");

    for page in 1..=start {
        if page == start {
            backend.push_users(3);
        } else {
            backend.push_full_page();
        }
        let outcome = if page == 1 {
            controller.submit().await
        } else {
            controller.page_forward().await
        };
        assert_eq!(outcome, FetchOutcome::Applied);
    }

    assert_eq!(controller.on_page_forward(), Trigger::Ignored);
    assert_eq!(controller.state().current_page, start);
    assert_eq!(backend.request_count(), start as usize);
}

#[tokio::test]
async fn test_forward_at_last_page_is_noop() {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    advance_to(&mut controller, &backend, MAX_PAGE).await;

    assert!(!controller.displayed().unwrap().has_more);
    assert_eq!(controller.page_forward().await, FetchOutcome::NotIssued);
    assert_eq!(controller.state().current_page, MAX_PAGE);
    assert_eq!(backend.request_count(), MAX_PAGE as usize);
}

#[tokio::test]
async fn test_back_at_first_page_is_noop() {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    advance_to(&mut controller, &backend, 1).await;

    assert_eq!(controller.on_page_back(), Trigger::Ignored);
    assert_eq!(controller.state().current_page, 1);
}

#[tokio::test]
async fn test_back_fetches_previous_page() {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    advance_to(&mut controller, &backend, 3).await;

    backend.push_full_page();
    assert_eq!(controller.page_back().await, FetchOutcome::Applied);

    assert_eq!(controller.state().current_page, 2);
    assert_eq!(backend.requests().last(), Some(&SearchQuery::new("octocat", 2)));
}

#[test]
fn test_paging_before_submit_is_noop() {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    controller.on_text_change("octocat");

    assert_eq!(controller.on_page_forward(), Trigger::Ignored);
    assert_eq!(controller.on_page_back(), Trigger::Ignored);
    assert_eq!(controller.state(), &PaginationState::default());
}

#[tokio::test]
async fn test_text_change_disarms_and_discards() {
    let backend = MockSearchBackend::new();
    let (mut controller, _) = controller_with(&backend);
    advance_to(&mut controller, &backend, 2).await;

    backend.push_full_page();
    let trigger = controller.on_page_forward();
    let ticket = trigger.ticket().cloned().unwrap();
    let runner = controller.runner();

    controller.on_text_change("octocats");
    assert_eq!(controller.phase(), ControllerPhase::Idle);
    assert_eq!(controller.state().current_page, 1);
    assert!(controller.displayed().is_none());

    let result = runner.run(&ticket).await;
    assert_eq!(controller.complete(ticket, result), FetchOutcome::Discarded);
    assert!(controller.displayed().is_none());
    assert_eq!(controller.state().current_page, 1);
}

#[tokio::test]
async fn test_empty_submit_notifies_validation() {
    let backend = MockSearchBackend::new();
    let mut notices = MockNotices::new();
    notices
        .expect_notify()
        .withf(|kind, message| *kind == NoticeKind::Validation && message == EMPTY_SEARCH_MESSAGE)
        .times(2)
        .return_const(());

    let mut controller = PaginationController::new(Arc::new(backend.clone()), Arc::new(notices));

    assert_eq!(controller.submit().await, FetchOutcome::NotIssued);
    controller.on_text_change(" \t ");
    assert_eq!(controller.on_submit(), Trigger::Rejected);

    assert_eq!(controller.phase(), ControllerPhase::Idle);
    assert_eq!(backend.request_count(), 0);
}

#[tokio::test]
async fn test_rate_limited_forward_reverts_and_notifies() {
    let backend = MockSearchBackend::new();
    let mut notices = MockNotices::new();
    notices
        .expect_notify()
        .withf(|kind, message| *kind == NoticeKind::RateLimited && message.starts_with("Could not fetch user list"))
        .times(1)
        .return_const(());

    let mut controller = PaginationController::new(Arc::new(backend.clone()), Arc::new(notices));
    controller.on_text_change("octocat");
    backend.push_full_page();
    controller.submit().await;

    backend.push_error(SearchError::rate_limited("quota"));
    assert_eq!(
        controller.page_forward().await,
        FetchOutcome::Failed(ErrorCategory::RateLimited)
    );

    assert_eq!(controller.state().current_page, 1);
    assert_eq!(controller.displayed().unwrap().page(), 1);
    assert_eq!(controller.phase(), ControllerPhase::Enabled);
}

#[tokio::test]
async fn test_transport_failure_keeps_results_and_reverts_page() {
    let backend = MockSearchBackend::new();
    let (mut controller, notifier) = controller_with(&backend);
    advance_to(&mut controller, &backend, 1).await;

    backend.push_error(SearchError::transport("connection reset"));
    assert_eq!(
        controller.page_forward().await,
        FetchOutcome::Failed(ErrorCategory::Transport)
    );

    assert_eq!(controller.state().current_page, 1);
    assert_eq!(controller.displayed().unwrap().page(), 1);
    assert_eq!(notifier.kinds(), vec![NoticeKind::Transport]);

    backend.push_users(3);
    assert_eq!(controller.page_forward().await, FetchOutcome::Applied);
    assert_eq!(controller.state().current_page, 2);
    assert_eq!(
        backend.requests(),
        vec![
            SearchQuery::new("octocat", 1),
            SearchQuery::new("octocat", 2),
            SearchQuery::new("octocat", 2),
        ]
    );
}

#[tokio::test]
async fn test_stale_window_reuses_pages() {
    let backend = MockSearchBackend::new();
    let notifier = RecordingNotifier::new();
    let mut controller = PaginationController::new(Arc::new(backend.clone()), Arc::new(notifier));
    advance_to(&mut controller, &backend, 2).await;

    assert_eq!(controller.page_back().await, FetchOutcome::Cached);
    assert_eq!(controller.page_forward().await, FetchOutcome::Cached);
    assert_eq!(controller.state().current_page, 2);
    assert_eq!(backend.request_count(), 2);

    controller.on_text_change("octocat");
    assert_eq!(controller.submit().await, FetchOutcome::Cached);
    assert_eq!(controller.metrics().snapshot().cache_hits, 3);
}

#[test]
fn test_blocking_submit() {
    let backend = MockSearchBackend::new();
    backend.push_users(1);
    let (mut controller, _) = controller_with(&backend);
    controller.on_text_change("octocat");

    let outcome = tokio_test::block_on(controller.submit());

    assert_eq!(outcome, FetchOutcome::Applied);
    assert_eq!(controller.state().last_query, Some(SearchQuery::first_page("octocat")));
}

#[tokio::test]
async fn test_octocat_single_result() {
    let server = MockServer::start().await;
    mount_rate_limit(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("q", "octocat in:login type:user"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::search_response_json(1)))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = RecordingNotifier::new();
    let mut controller = PaginationController::from_client(&client_for(&server), Arc::new(notifier.clone()));

    controller.on_text_change("octocat");
    assert_eq!(controller.submit().await, FetchOutcome::Applied);
    assert_eq!(controller.displayed().unwrap().len(), 1);

    assert_eq!(controller.page_forward().await, FetchOutcome::NotIssued);
    assert_eq!(controller.state().current_page, 1);
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_exhausted_quota_blocks_search() {
    let server = MockServer::start().await;
    mount_rate_limit(&server, 0).await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::search_response_json(10)))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let notifier = RecordingNotifier::new();
    let mut controller = PaginationController::from_client(&client, Arc::new(notifier.clone()));

    controller.on_text_change("a");
    assert_eq!(
        controller.submit().await,
        FetchOutcome::Failed(ErrorCategory::RateLimited)
    );

    assert_eq!(controller.state().current_page, 1);
    assert!(controller.displayed().is_none());
    assert_eq!(notifier.kinds(), vec![NoticeKind::RateLimited]);
    assert_eq!(client.metrics().snapshot().fetches_rate_limited, 1);
}

#[tokio::test]
async fn test_full_first_page_then_short_second() {
    let server = MockServer::start().await;
    mount_rate_limit(&server, 10).await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::search_response_json(10)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::search_response_json(3)))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = PaginationController::from_client(&client_for(&server), Arc::new(RecordingNotifier::new()));

    controller.on_text_change("tom");
    assert_eq!(controller.submit().await, FetchOutcome::Applied);
    assert_eq!(controller.page_forward().await, FetchOutcome::Applied);
    assert_eq!(controller.displayed().unwrap().len(), 3);

    assert_eq!(controller.page_forward().await, FetchOutcome::NotIssued);
    assert_eq!(controller.state().current_page, 2);
}
