//! Token lifecycle against a real SQLite store and a mocked token endpoint.

mod support;

use std::sync::Arc;
use std::time::Duration;

use support::{expired_record, grant_response, Stack, NOW, TOKEN_PATH};
use tokenwarden_core::TokenRecordStore;
use tokenwarden_domain::{CommandPermissions, TokenRecord, UserId};
use tokenwarden_infra::{CommandPermissionsClient, HttpClient};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: UserId = UserId(288_163_958_022_471_680);

#[tokio::test(flavor = "multi_thread")]
async fn expired_record_is_refreshed_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("refresh_token=stale-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_response()))
        .expect(1)
        .mount(&server)
        .await;

    let stack = Stack::new(&server);
    stack.repository.save(&expired_record(USER)).await.unwrap();

    let token = stack.manager.get_valid_token(USER).await.expect("token");

    assert_eq!(token.bearer_token, "fresh-access");
    assert_eq!(token.expires_at, NOW + 604_800);
    let stored = stack.repository.find_by_user_id(USER).await.unwrap().expect("row");
    assert_eq!(stored, token);
    assert_eq!(stored.refresh_token.as_deref(), Some("fresh-refresh"));
}

#[tokio::test(flavor = "multi_thread")]
async fn valid_record_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let stack = Stack::new(&server);
    let record = TokenRecord::new(USER, "live-access", "live-refresh", NOW + 600);
    stack.repository.save(&record).await.unwrap();

    assert_eq!(stack.manager.get_valid_token(USER).await, Some(record));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_refresh_leaves_stored_record_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "invalid_grant"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stack = Stack::new(&server);
    stack.repository.save(&expired_record(USER)).await.unwrap();

    assert!(stack.manager.get_valid_token(USER).await.is_none());
    let stored = stack.repository.find_by_user_id(USER).await.unwrap();
    assert_eq!(stored, Some(expired_record(USER)));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_user_is_absent() {
    let server = MockServer::start().await;
    let stack = Stack::new(&server);

    assert!(stack.manager.get_valid_token(USER).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_lookups_present_the_refresh_token_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(grant_response())
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stack = Stack::new(&server);
    stack.repository.save(&expired_record(USER)).await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&stack.manager);
            tokio::spawn(async move { manager.get_valid_token(USER).await })
        })
        .collect();

    for handle in handles {
        let token = handle.await.unwrap().expect("token");
        assert_eq!(token.bearer_token, "fresh-access");
    }
    assert_eq!(stack.manager.active_refresh_guards(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn refreshed_token_is_used_for_permission_edit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_response()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/applications/1/guilds/2/commands/3/permissions"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let stack = Stack::new(&server);
    stack.repository.save(&expired_record(USER)).await.unwrap();

    let token = stack.manager.get_valid_token(USER).await.expect("token");
    let client = CommandPermissionsClient::new(server.uri(), HttpClient::builder().build().unwrap());
    let result = client
        .edit_command_permissions(1, 2, 3, &CommandPermissions::default(), &token)
        .await
        .expect("permission call");

    assert!(result.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn record_expiring_later_is_refreshed_once_clock_passes_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grant_response()))
        .expect(1)
        .mount(&server)
        .await;

    let stack = Stack::new(&server);
    let record = TokenRecord::new(USER, "live-access", "live-refresh", NOW + 600);
    stack.repository.save(&record).await.unwrap();

    assert_eq!(stack.manager.get_valid_token(USER).await.unwrap().bearer_token, "live-access");
    stack.clock.advance(Duration::from_secs(600));
    let token = stack.manager.get_valid_token(USER).await.unwrap();

    assert_eq!(token.bearer_token, "fresh-access");
    assert_eq!(token.expires_at, NOW + 600 + 604_800);
}
