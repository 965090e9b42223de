// Shared fixtures for HTTP-level tests.

#![allow(dead_code)]

use std::time::Duration;

use folio_github::{GitHubClient, RetryPolicy};
use serde_json::{Value, json};
use wiremock::MockServer;

pub const USERNAME: &str = "octocat";

/// Client pointed at the mock server with short backoff delays.
pub fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new(USERNAME, None)
        .unwrap()
        .with_base_url(&server.uri())
        .with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
}

pub fn profile_json() -> Value {
    json!({
        "login": USERNAME,
        "id": 583231,
        "name": "The Octocat",
        "bio": null,
        "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4",
        "public_repos": 8,
        "followers": 9000,
        "following": 9
    })
}

pub fn repo_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("{}/{}", USERNAME, name),
        "description": format!("{} description", name),
        "html_url": format!("https://github.com/{}/{}", USERNAME, name),
        "homepage": null,
        "language": "Rust",
        "stargazers_count": id * 10,
        "forks_count": id,
        "topics": ["portfolio"],
        "updated_at": "2024-05-01T12:00:00Z"
    })
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}
