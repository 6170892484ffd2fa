//! HTTP tests running the full router over the SQLite store.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_collection, create_entry, delete, entry_form, get, patch_multipart,
    post_multipart,
};
use tokio::task::JoinSet;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_all_return_201() {
    let test = common::build_sqlite_test_app().await;
    let photos = create_collection(&test, "Photos").await;

    let mut tasks = JoinSet::new();
    for i in 0..50 {
        let app = test.app();
        tasks.spawn(async move {
            post_multipart(app, "/api/v1/entry", entry_form(&format!("E{i}"), "d", photos))
                .await
                .status()
        });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::CREATED);
    }

    let response = get(test.app(), "/api/v1/entries?count=0").await;
    assert_eq!(body_json(response).await["data"]["totalResultCount"], 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_edits_all_return_200() {
    let test = common::build_sqlite_test_app().await;
    let letters = create_collection(&test, "Letters").await;
    let mut ids = Vec::new();
    for i in 0..5 {
        let entry = create_entry(&test, entry_form(&format!("Seed {i}"), "d", 0)).await;
        ids.push(entry["id"].as_i64().unwrap());
    }

    let mut tasks = JoinSet::new();
    for i in 0..40usize {
        let app = test.app();
        let id = ids[i % ids.len()];
        tasks.spawn(async move {
            patch_multipart(
                app,
                &format!("/api/v1/entry/{id}"),
                entry_form(&format!("Edit {i}"), "d", letters),
            )
            .await
            .status()
        });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    let response = get(test.app(), &format!("/api/v1/collection/{letters}/entries")).await;
    assert_eq!(body_json(response).await["data"]["totalResultCount"], 5);
}

#[tokio::test]
async fn collection_scenario_over_sqlite() {
    let test = common::build_sqlite_test_app().await;
    let photos = create_collection(&test, "Photos").await;
    assert_eq!(photos, 1);

    let entry = create_entry(&test, entry_form("A", "d", photos)).await;
    assert_eq!(entry["id"], 1);
    assert_eq!(entry["collection"]["name"], "Photos");

    let response = delete(test.app(), "/api/v1/collection/1").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(test.app(), "/api/v1/entry/1").await;
    assert_eq!(body_json(response).await["data"]["collectionId"], 0);

    let response = delete(test.app(), "/api/v1/collection/0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(test.app(), "/health").await;
    assert_eq!(body_json(response).await["db_healthy"], true);
}
