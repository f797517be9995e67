mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::auth::{auth_header, login_and_get_token};
use common::fixtures::seed_tutorial_words;
use common::http::{assert_status_ok_json, request, response_json};

#[tokio::test]
async fn tutorial_walks_all_five_exercise_types() {
    let app = spawn_test_app().await;
    seed_tutorial_words(app.state.store());
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/tutorial/vocabulary",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);

    let data = &body["data"];
    assert_eq!(data["word"]["word"], "apple");

    let steps = data["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 5);
    let types: Vec<&str> = steps.iter().map(|s| s["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec![
            "reading_lv1",
            "reading_lv2",
            "listening_lv1",
            "speaking_lv1",
            "speaking_lv2"
        ]
    );
    for (index, step) in steps.iter().enumerate() {
        assert_eq!(step["step"], index as u64 + 1);
        let options = step["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        let correct_index = step["correctIndex"].as_u64().unwrap() as usize;
        assert_eq!(options[correct_index]["wordId"], data["word"]["id"]);
    }
}

#[tokio::test]
async fn tutorial_requires_seeded_words() {
    let app = spawn_test_app().await;
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/tutorial/vocabulary",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, _) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completion_keeps_first_timestamp() {
    let app = spawn_test_app().await;
    seed_tutorial_words(app.state.store());
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/tutorial/vocabulary/complete",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    let first = body["data"]["completedAt"].as_str().unwrap().to_string();

    let resp = request(
        &app.app,
        Method::POST,
        "/api/tutorial/vocabulary/complete",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(resp).await;
    assert_eq!(body["data"]["completedAt"], first.as_str());
}
