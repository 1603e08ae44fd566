//! Integration tests for the Secret Santa bounded context.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_raffle_create_execute_and_lookup() {
    // Arrange
    let app = common::build_test_app();
    let people: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let (status, json) = common::post_json(
        app.clone(),
        "/api/v1/raffles",
        &json!({
            "name": "Family 2026",
            "participant_ids": people,
            "budget_cents": 3000,
            "created_by": people[0],
            "year": 2026
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let raffle_id = json["id"].as_str().unwrap().to_owned();

    // Act
    let (executed, _) =
        common::post_json(app.clone(), &format!("/api/v1/raffles/{raffle_id}/execute"), &json!({})).await;
    let (again, again_json) =
        common::post_json(app.clone(), &format!("/api/v1/raffles/{raffle_id}/execute"), &json!({})).await;
    let (_, view) = common::get_json(app.clone(), &format!("/api/v1/raffles/{raffle_id}")).await;
    let (status, assignment) = common::get_json(
        app.clone(),
        &format!("/api/v1/raffles/{raffle_id}/assignments/{}", people[1]),
    )
    .await;
    let (_, mine) = common::get_json(app, &format!("/api/v1/raffles?member_id={}", people[2])).await;

    // Assert
    assert_eq!(executed, StatusCode::OK);
    assert_eq!(again, StatusCode::CONFLICT);
    assert_eq!(again_json["error"], "invalid_state");
    assert_eq!(view["is_executed"], true);
    assert_eq!(view["assignments"].as_array().unwrap().len(), 4);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assignment["giver"], people[1].to_string());
    assert_ne!(assignment["receiver"], people[1].to_string());
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_odd_participant_count_is_400() {
    let app = common::build_test_app();

    let (status, json) = common::post_json(
        app,
        "/api/v1/raffles",
        &json!({
            "name": "Trio",
            "participant_ids": [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()],
            "created_by": Uuid::new_v4(),
            "year": 2026
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_input");
}

#[tokio::test]
async fn test_cancelled_raffle_cannot_execute_and_drops_from_year_listing() {
    // Arrange
    let app = common::build_test_app();
    let raffle_id = Uuid::new_v4();
    common::post_json(
        app.clone(),
        "/api/v1/raffles",
        &json!({
            "raffle_id": raffle_id,
            "name": "Office",
            "participant_ids": [Uuid::new_v4(), Uuid::new_v4()],
            "created_by": Uuid::new_v4(),
            "year": 2026
        }),
    )
    .await;

    // Act
    let (cancelled, _) = common::post_json(
        app.clone(),
        &format!("/api/v1/raffles/{raffle_id}/cancel"),
        &json!({ "cancelled_by": Uuid::new_v4() }),
    )
    .await;
    let (execute, _) =
        common::post_json(app.clone(), &format!("/api/v1/raffles/{raffle_id}/execute"), &json!({})).await;
    let (_, this_year) = common::get_json(app.clone(), "/api/v1/raffles?year=2026").await;
    let (_, all) = common::get_json(app.clone(), "/api/v1/raffles").await;
    let (no_draw, _) = common::get_json(
        app,
        &format!("/api/v1/raffles/{raffle_id}/assignments/{}", Uuid::new_v4()),
    )
    .await;

    // Assert
    assert_eq!(cancelled, StatusCode::OK);
    assert_eq!(execute, StatusCode::CONFLICT);
    assert!(this_year.as_array().unwrap().is_empty());
    assert_eq!(all[0]["is_cancelled"], true);
    assert_eq!(no_draw, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_raffle_execute_is_404() {
    let app = common::build_test_app();

    let (status, json) =
        common::post_json(app, &format!("/api/v1/raffles/{}/execute", Uuid::new_v4()), &json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}
