//! Shared helpers for integration tests.

#![allow(dead_code)]

use integrations_github_search::mocks::fixtures;
use integrations_github_search::SearchClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a client pointed at the mock server.
pub fn client_for(server: &MockServer) -> SearchClient {
    SearchClient::builder()
        .base_url(server.uri())
        .user_agent("integrations-github-search-tests")
        .build()
        .expect("Failed to build client")
}

/// Serves `GET /rate_limit` with the given search quota left.
pub async fn mount_rate_limit(server: &MockServer, remaining: u32) {
    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::rate_limit_json(remaining)))
        .mount(server)
        .await;
}
