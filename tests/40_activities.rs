mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{ids, TestApp, ADMIN, INSTRUCTOR, STUDENT};

#[tokio::test]
async fn activity_lifecycle() -> Result<()> {
    let app = TestApp::new();
    let created = app
        .create(
            "/activities",
            json!({ "title": "Engine run-up", "activityType": "ground", "duration": 15 }),
        )
        .await?;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["duration"], 15);
    assert!(created["referenceId"].is_null());

    let (status, body) = app
        .put(
            "/activities",
            ADMIN,
            json!({ "id": id, "title": "Engine run-up", "activityType": "ground", "duration": 20, "referenceId": 7 }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["data"]["duration"], 20);
    assert_eq!(body["data"]["referenceId"], 7);

    let (status, body) = app.get(&format!("/activities/{}", id), INSTRUCTOR).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["duration"], 20);

    let (status, body) = app.get("/activities", INSTRUCTOR).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = app.delete(&format!("/activities/{}", id), INSTRUCTOR).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&format!("/activities/{}", id), INSTRUCTOR).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], format!("No activity found for ID [{}]", id));
    Ok(())
}

#[tokio::test]
async fn deleting_an_activity_unlinks_it_from_plans() -> Result<()> {
    let app = TestApp::new();
    let first = app
        .create("/activities", json!({ "title": "Preflight", "activityType": "ground" }))
        .await?;
    let second = app
        .create("/activities", json!({ "title": "Pattern work", "activityType": "flight" }))
        .await?;
    let plan = app
        .create("/lessonplans", json!({ "title": "First flight", "summary": "Intro flight" }))
        .await?;

    let (status, _) = app
        .put(
            "/lessonplans",
            INSTRUCTOR,
            json!({
                "id": plan["id"],
                "title": "First flight",
                "summary": "Intro flight",
                "activityIds": [first["id"], second["id"]]
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    app.delete(&format!("/activities/{}", first["id"]), ADMIN).await?;

    let (_, fetched) = app.get(&format!("/lessonplans/{}", plan["id"]), ADMIN).await?;
    assert_eq!(ids(&fetched["data"]["activityIds"]), vec![second["id"].as_i64().unwrap()]);
    Ok(())
}

#[tokio::test]
async fn activities_are_closed_to_students() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app
        .post("/activities", STUDENT, json!({ "title": "Solo", "activityType": "flight" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn missing_required_field_is_invalid() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.post("/activities", INSTRUCTOR, json!({ "title": "Solo" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unexpected body: {}", body);
    assert_eq!(body["code"], "INVALID_PAYLOAD");
    Ok(())
}
