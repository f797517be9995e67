mod common;

use axum::http::Method;

use common::app::spawn_test_app;
use common::auth::{auth_header, login_and_get_token};
use common::fixtures::seed_catalog;
use common::http::{assert_status_ok_json, request, response_json};

#[tokio::test]
async fn seed_words_imports_and_skips_duplicates() {
    let app = spawn_test_app().await;
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/admin/seed-words",
        Some(serde_json::json!({ "words": [
            { "word": "apple", "translation": "苹果" },
            { "word": "banana", "translation": "香蕉" },
        ] })),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["wordsImported"], 2);
    assert_eq!(body["data"]["wordsSkipped"], 0);

    let resp = request(
        &app.app,
        Method::POST,
        "/api/admin/seed-words",
        Some(serde_json::json!({ "words": [
            { "word": "apple", "translation": "苹果" },
            { "word": "cherry", "translation": "樱桃" },
        ] })),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(resp).await;
    assert_eq!(body["data"]["wordsImported"], 1);
    assert_eq!(body["data"]["wordsSkipped"], 1);

    let resp = request(
        &app.app,
        Method::GET,
        "/api/admin/words",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (_, _, body) = response_json(resp).await;
    assert_eq!(body["data"]["totalCount"], 3);
}

#[tokio::test]
async fn word_pool_synthesizes_p0_from_catalog() {
    let app = spawn_test_app().await;
    seed_catalog(app.state.store(), 7);
    let token = login_and_get_token(&app.app).await;

    let resp = request(
        &app.app,
        Method::GET,
        "/api/admin/word-pool",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);

    let pools = &body["data"]["pools"];
    assert_eq!(pools["P0"].as_array().unwrap().len(), 7);
    for pool in ["P1", "P2", "P3", "P4", "P5", "P6", "R1", "R2", "R3", "R4", "R5"] {
        assert_eq!(pools[pool].as_array().unwrap().len(), 0, "pool {pool}");
    }
    assert!(pools["P0"][0]["nextAvailableTime"].is_null());
    assert_eq!(body["data"]["totalCount"], 7);
}

#[tokio::test]
async fn reset_progress_returns_everything_to_p0() {
    let app = spawn_test_app().await;
    seed_catalog(app.state.store(), 10);
    let token = login_and_get_token(&app.app).await;

    // 学习一批
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
    request(
        &app.app,
        Method::POST,
        "/api/learn/complete",
        Some(serde_json::json!({ "wordIds": word_ids })),
        &[("authorization", auth_header(&token))],
    )
    .await;

    let resp = request(
        &app.app,
        Method::POST,
        "/api/admin/reset-progress",
        None,
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["wordsReset"], 5);

    // 重置后当日限额一并清零，可以立即再学
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
}

#[tokio::test]
async fn seed_accepts_curriculum_tags() {
    let app = spawn_test_app().await;
    let token = login_and_get_token(&app.app).await;

    let tagged = serde_json::json!({
        "word": "volcano", "translation": "火山",
        "level": { "label": "Level 2", "order": 2 },
        "category": { "label": "Nature", "order": 1 },
    });

    let resp = request(
        &app.app,
        Method::POST,
        "/api/admin/seed-words",
        Some(serde_json::json!({ "words": [tagged] })),
        &[("authorization", auth_header(&token))],
    )
    .await;
    let (status, _, body) = response_json(resp).await;
    assert_status_ok_json(status, &body);
    assert_eq!(body["data"]["wordsImported"], 1);

    let word = app
        .state
        .store()
        .get_word_by_headword("volcano")
        .unwrap()
        .unwrap();
    assert_eq!(word.level.as_ref().map(|t| t.order), Some(2));
    assert_eq!(word.category.as_ref().map(|t| t.order), Some(1));
}
