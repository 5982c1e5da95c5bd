// SPDX-FileCopyrightText: 2026 ghbackup Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pagination and failure behaviour of the discovery client against a mock API.

use std::sync::Arc;

use ghbackup_core::RepositoryLister;
use ghbackup_github::GithubClient;
use ghbackup_test_utils::RecordingSink;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page(org: &str, names: &[&str]) -> Value {
    Value::Array(
        names
            .iter()
            .map(|n| json!({ "full_name": format!("{org}/{n}"), "owner": { "login": org } }))
            .collect(),
    )
}

fn client(server: &MockServer, sink: Arc<RecordingSink>) -> GithubClient {
    GithubClient::new(&SecretString::from("ghp_test".to_string()), sink)
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn follows_next_links_across_three_pages() {
    let server = MockServer::start().await;
    let next = |n: u32| {
        format!(
            "<{}/organizations/42/repos?per_page=100&page={n}>; rel=\"next\", <{}/organizations/42/repos?per_page=100&page=3>; rel=\"last\"",
            server.uri(),
            server.uri()
        )
    };

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next(2).as_str())
                .set_body_json(page("acme", &["a", "b"])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/42/repos"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next(3).as_str())
                .set_body_json(page("acme", &["c", "d", "e"])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/42/repos"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page("acme", &["f"])))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let repos = client(&server, sink.clone()).list("acme").await.unwrap();

    assert_eq!(repos.len(), 6);
    assert_eq!(repos[0].full_name, "acme/a");
    assert_eq!(repos[5].full_name, "acme/f");
    assert!(repos.iter().all(|r| r.owner_login == "acme"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert_eq!(sink.discovered("acme"), 6);
}

#[tokio::test]
async fn non_success_status_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/ghost/repos"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\":\"Not Found\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, Arc::new(RecordingSink::default()))
        .list("ghost")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "discovery");
    assert!(err.to_string().contains("404"), "got: {err}");
}

#[tokio::test]
async fn failure_on_later_page_returns_no_partial_result() {
    let server = MockServer::start().await;
    let link = format!("<{}/organizations/42/repos?page=2>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", link.as_str())
                .set_body_json(page("acme", &["a"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/42/repos"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server, Arc::new(RecordingSink::default()))
        .list("acme")
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unparseable_body_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\":\"an array\"}"))
        .mount(&server)
        .await;

    let err = client(&server, Arc::new(RecordingSink::default()))
        .list("acme")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("parse"), "got: {err}");
}
