//! Upload orchestrator behavior against mocked Telegram and media-host APIs.

use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skishop_bot::media::MediaHost;
use skishop_bot::telegram::TelegramClient;
use skishop_bot::upload::upload_staged;
use skishop_core::config::MediaHostSettings;

const TOKEN: &str = "123:testtoken";

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::with_base_url(server.uri(), TOKEN.to_string())
}

fn media_host(server: &MockServer) -> MediaHost {
    MediaHost::new(MediaHostSettings {
        base_url: server.uri(),
        api_key: "media-key".to_string(),
        folder: "skishop/manual-upload".to_string(),
    })
}

async fn mock_get_file(server: &MockServer, file_id: &str, file_path: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/getFile")))
        .and(body_partial_json(json!({ "file_id": file_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": { "file_path": file_path }
        })))
        .mount(server)
        .await;
}

async fn mock_get_file_failure(server: &MockServer, file_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{TOKEN}/getFile")))
        .and(body_partial_json(json!({ "file_id": file_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: file not found"
        })))
        .mount(server)
        .await;
}

async fn mock_download(server: &MockServer, file_path: &str, bytes: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{TOKEN}/{file_path}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.as_bytes().to_vec()))
        .mount(server)
        .await;
}

async fn mock_upload(server: &MockServer, marker: &str, url: &str) {
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains(marker))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": url })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn uploads_preserve_staged_order() {
    let telegram = MockServer::start().await;
    let media = MockServer::start().await;

    mock_get_file(&telegram, "f1", "photos/f1.jpg").await;
    mock_get_file(&telegram, "f2", "photos/f2.jpg").await;
    mock_download(&telegram, "photos/f1.jpg", "PHOTO-ONE").await;
    mock_download(&telegram, "photos/f2.jpg", "PHOTO-TWO").await;
    mock_upload(&media, "PHOTO-ONE", "https://img.example/one.jpg").await;
    mock_upload(&media, "PHOTO-TWO", "https://img.example/two.jpg").await;

    let staged = vec!["f1".to_string(), "f2".to_string()];
    let outcome = upload_staged(&client(&telegram), &media_host(&media), &staged).await;

    assert!(outcome.is_full());
    assert_eq!(
        outcome.urls,
        vec!["https://img.example/one.jpg", "https://img.example/two.jpg"]
    );
}

#[tokio::test]
async fn failed_items_are_dropped_without_affecting_siblings() {
    let telegram = MockServer::start().await;
    let media = MockServer::start().await;

    mock_get_file(&telegram, "f1", "photos/f1.jpg").await;
    mock_get_file_failure(&telegram, "f2").await;
    mock_get_file(&telegram, "f3", "photos/f3.jpg").await;
    mock_download(&telegram, "photos/f1.jpg", "PHOTO-ONE").await;
    mock_download(&telegram, "photos/f3.jpg", "PHOTO-THREE").await;
    mock_upload(&media, "PHOTO-ONE", "https://img.example/one.jpg").await;
    mock_upload(&media, "PHOTO-THREE", "https://img.example/three.jpg").await;

    let staged = vec!["f1".to_string(), "f2".to_string(), "f3".to_string()];
    let outcome = upload_staged(&client(&telegram), &media_host(&media), &staged).await;

    assert_eq!(outcome.attempted, 3);
    assert!(!outcome.is_full());
    assert_eq!(
        outcome.urls,
        vec!["https://img.example/one.jpg", "https://img.example/three.jpg"]
    );
}

#[tokio::test]
async fn media_host_errors_fail_only_that_photo() {
    let telegram = MockServer::start().await;
    let media = MockServer::start().await;

    mock_get_file(&telegram, "f1", "photos/f1.jpg").await;
    mock_get_file(&telegram, "f2", "photos/f2.jpg").await;
    mock_download(&telegram, "photos/f1.jpg", "PHOTO-ONE").await;
    mock_download(&telegram, "photos/f2.jpg", "PHOTO-TWO").await;
    mock_upload(&media, "PHOTO-ONE", "https://img.example/one.jpg").await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(body_string_contains("PHOTO-TWO"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&media)
        .await;

    let staged = vec!["f1".to_string(), "f2".to_string()];
    let outcome = upload_staged(&client(&telegram), &media_host(&media), &staged).await;

    assert_eq!(outcome.attempted, 2);
    assert_eq!(outcome.urls, vec!["https://img.example/one.jpg"]);
}
