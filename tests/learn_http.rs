mod common;

use axum::http::Method;

use common::app::spawn_test_app;
use common::auth::{auth_header, login_and_get_token};
use common::fixtures::seed_catalog;
use common::http::{assert_status_ok_json, request, response_json};

#[tokio::test]
async fn learn_session_serves_five_reading_exercises() {
    let app = spawn_test_app().await;
    seed_catalog(app.state.store(), 12);
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/learn/session",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);

    let data = &body["data"];
    assert_eq!(data["available"], true);
    assert_eq!(data["words"].as_array().unwrap().len(), 5);
    let exercises = data["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 5);
    for exercise in exercises {
        assert_eq!(exercise["type"], "reading_lv1");
        let options = exercise["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        let correct_index = exercise["correctIndex"].as_u64().unwrap() as usize;
        assert_eq!(options[correct_index]["wordId"], exercise["wordId"]);
        // 阅读题选项不暴露词形
        for option in options {
            assert!(option.get("word").is_none());
            assert!(option.get("translation").is_some());
        }
    }
}

#[tokio::test]
async fn completing_learn_moves_words_and_updates_stats() {
    let app = spawn_test_app().await;
    seed_catalog(app.state.store(), 12);
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/learn/session",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(resp).await;
    let word_ids: Vec<String> = body["data"]["words"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_str().unwrap().to_string())
        .collect();

    let resp = request(
        &app.app,
        Method::POST,
        "/api/learn/complete",
        Some(serde_json::json!({ "wordIds": word_ids })),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["wordsMoved"], 5);
    assert_eq!(body["data"]["todayLearned"], 5);

    let resp = request(
        &app.app,
        Method::GET,
        "/api/home/stats",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(resp).await;
    assert_eq!(body["data"]["todayLearned"], 5);
    assert_eq!(body["data"]["upcoming24h"], 5);
    assert_eq!(body["data"]["canPractice"], false);
}

#[tokio::test]
async fn empty_catalog_reports_no_words_in_p0() {
    let app = spawn_test_app().await;
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/learn/session",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(resp).await;
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["reason"], "no_words_in_p0");
}

#[tokio::test]
async fn unknown_word_ids_are_dropped_from_completion() {
    let app = spawn_test_app().await;
    let ids = seed_catalog(app.state.store(), 6);
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/learn/complete",
        Some(serde_json::json!({ "wordIds": [ids[0], "missing-id"] })),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["wordsMoved"], 1);
}

#[tokio::test]
async fn backpressure_reports_p1_pool_full() {
    let app = spawn_test_app().await;
    seed_catalog(app.state.store(), 20);
    let token = login_and_get_token(&app.app).await;

    // 连续两批共 10 个词，全部处于 10 分钟等待期内
    for _ in 0..2 {
        let resp = request(
            &app.app,
            Method::GET,
            "/api/learn/session",
            None,
            &[("authorization", auth_header(&token))],
        )
        .await;
        let (_, _, body) = response_json(resp).await;
        assert_eq!(body["data"]["available"], true);
        let word_ids: Vec<String> = body["data"]["words"]
            .as_array()
            .unwrap()
            .iter()
            .map(|w| w["id"].as_str().unwrap().to_string())
            .collect();
        request(
            &app.app,
            Method::POST,
            "/api/learn/complete",
            Some(serde_json::json!({ "wordIds": word_ids })),
            &[("authorization", auth_header(&token))],
        )
        .await;
    }

    let resp = request(
        &app.app,
        Method::GET,
        "/api/learn/session",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(resp).await;
    assert_eq!(body["data"]["available"], false);
    assert_eq!(body["data"]["reason"], "p1_pool_full");
}
