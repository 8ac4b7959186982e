pub mod common;

use reqwest::StatusCode;

#[tokio::test]
async fn retrieves_current_worker() {
    let login = common::unique_login("alice");
    let client = common::Client::new();
    let registered =
        client.register("Alice", &login, "password").await.unwrap();
    let client = client.auth(&login, "password").await;

    let profile = client.worker().await.unwrap();
    assert_eq!(profile.id, registered.id);
    assert_eq!(profile.name, "Alice");
    assert_eq!(profile.hourly_rate, 10.0);
    assert!(profile.time_slots.is_empty());
}

#[tokio::test]
async fn fails_when_unauthorized() {
    let status = common::Client::new().worker().await.unwrap_err();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
