pub mod common;

use car_workshop::api;
use reqwest::StatusCode;

#[tokio::test]
async fn edits_ticket_fields() {
    let client = common::worker_client("Alice").await;

    let ticket = client
        .add_ticket("Lada", "Granta", "A123BC", "Broken headlight")
        .await
        .unwrap();
    let ticket = client
        .edit_ticket(
            ticket.id,
            "Lada",
            "Vesta",
            "A123BC",
            "Broken headlight and wiring",
            api::ticket::Status::InProgress,
        )
        .await
        .unwrap();

    assert_eq!(ticket.brand, "Lada");
    assert_eq!(ticket.model, "Vesta");
    assert_eq!(ticket.registration_id, "A123BC");
    assert_eq!(ticket.description, "Broken headlight and wiring");
    assert_eq!(ticket.status, api::ticket::Status::InProgress);
    assert_eq!(ticket.total_price, 0.0);
}

#[tokio::test]
async fn keeps_derived_total_price() {
    let client = common::worker_client("Alice").await;

    let ticket = client
        .add_ticket("Lada", "Granta", "A123BC", "Broken headlight")
        .await
        .unwrap();
    client
        .add_part(ticket.id, "Headlight", 100.0, 2.0)
        .await
        .unwrap();

    let ticket = client
        .edit_ticket(
            ticket.id,
            "Lada",
            "Granta",
            "A123BC",
            "Broken headlight",
            api::ticket::Status::Done,
        )
        .await
        .unwrap();
    assert_eq!(ticket.status, api::ticket::Status::Done);
    assert_eq!(ticket.total_price, 200.0);
}

#[tokio::test]
async fn cant_edit_with_empty_fields() {
    let client = common::worker_client("Alice").await;

    let ticket = client
        .add_ticket("Lada", "Granta", "A123BC", "Broken headlight")
        .await
        .unwrap();
    let status = client
        .edit_ticket(
            ticket.id,
            "",
            "Granta",
            "A123BC",
            "Broken headlight",
            api::ticket::Status::Created,
        )
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fails_when_missing() {
    let client = common::worker_client("Alice").await;

    let status = client
        .edit_ticket(
            api::ticket::Id::default(),
            "Lada",
            "Granta",
            "A123BC",
            "Broken headlight",
            api::ticket::Status::Created,
        )
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::NOT_FOUND);
}
