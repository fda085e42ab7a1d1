mod common;

use axum::http::StatusCode;
use common::{id_of, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_fetch_major(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;

    let response = app
        .post(
            "/api/majors",
            Some(&token),
            json!({
                "code": "TKJ",
                "name": "Teknik Komputer dan Jaringan",
                "description": "Jaringan dan server",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["isActive"], true);
    assert_eq!(response.body["counts"]["students"], 0);

    let fetched = app
        .get(&format!("/api/majors/{}", id_of(&response.body)), None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["code"], "TKJ");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_major_code_conflicts(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    app.create_major(&token, "RPL").await;

    let response = app
        .post(
            "/api/majors",
            Some(&token),
            json!({ "code": "RPL", "name": "Rekayasa Perangkat Lunak" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "A major with this code already exists");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM majors WHERE code = 'RPL'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_renaming_major_onto_taken_code_conflicts(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    app.create_major(&token, "TKJ").await;
    let rpl = app.create_major(&token, "RPL").await;

    let response = app
        .patch(
            &format!("/api/majors/{}", id_of(&rpl)),
            Some(&token),
            json!({ "code": "TKJ" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "A major with this code already exists");

    let unchanged = app.get(&format!("/api/majors/{}", id_of(&rpl)), None).await;
    assert_eq!(unchanged.body["code"], "RPL");
    let tkj = app.get("/api/majors?search=TKJ", None).await;
    assert_eq!(tkj.body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    app.create_major(&token, "TKJ").await;
    app.create_major(&token, "RPL").await;

    let percent = app.get("/api/majors?search=%25", None).await;
    assert_eq!(percent.status, StatusCode::OK);
    assert_eq!(percent.body["meta"]["total"], 0);

    let underscore = app.get("/api/majors?search=_", None).await;
    assert_eq!(underscore.body["meta"]["total"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_major_writes_require_admin(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let (_, teacher_token) = app.register_teacher("Guru Jaringan").await;

    let anonymous = app
        .post("/api/majors", None, json!({ "code": "MM", "name": "Multimedia" }))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let teacher = app
        .post(
            "/api/majors",
            Some(&teacher_token),
            json!({ "code": "MM", "name": "Multimedia" }),
        )
        .await;
    assert_eq!(teacher.status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_pagination_second_page(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    for i in 1..=12 {
        app.create_major(&token, &format!("M{:02}", i)).await;
    }

    let response = app.get("/api/majors?page=2&limit=5", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let codes: Vec<&str> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["M07", "M06", "M05", "M04", "M03"]);
    assert_eq!(
        response.body["meta"],
        json!({ "total": 12, "page": 2, "limit": 5, "totalPages": 3 })
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_page_far_past_the_end_is_empty(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    app.create_major(&token, "TKJ").await;

    let response = app
        .get("/api/majors?page=9223372036854775807&limit=100", None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"], json!([]));
    assert_eq!(response.body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_and_active_filter(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    app.create_major(&token, "TKJ").await;
    let tei = app.create_major(&token, "TEI").await;
    app.patch(
        &format!("/api/majors/{}", id_of(&tei)),
        Some(&token),
        json!({ "isActive": false }),
    )
    .await;

    let search = app.get("/api/majors?search=tk", None).await;
    assert_eq!(search.body["meta"]["total"], 1);
    assert_eq!(search.body["data"][0]["code"], "TKJ");

    let inactive = app.get("/api/majors?isActive=false", None).await;
    assert_eq!(inactive.body["meta"]["total"], 1);
    assert_eq!(inactive.body["data"][0]["code"], "TEI");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_major_clears_description(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let major = app
        .post(
            "/api/majors",
            Some(&token),
            json!({ "code": "MM", "name": "Multimedia", "description": "Desain" }),
        )
        .await
        .body;

    let response = app
        .patch(
            &format!("/api/majors/{}", id_of(&major)),
            Some(&token),
            json!({ "description": null, "name": "Multimedia Kreatif" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["description"], serde_json::Value::Null);
    assert_eq!(response.body["name"], "Multimedia Kreatif");
    assert_eq!(response.body["code"], "MM");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_major_blocked_by_students(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let major = app.create_major(&token, "TKJ").await;
    let major_id = id_of(&major);
    for _ in 0..2 {
        let registered = app.register_student(&major_id, None).await;
        assert_eq!(registered.status, StatusCode::CREATED);
    }

    let response = app
        .delete(&format!("/api/majors/{}", major_id), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["dependents"]["students"], 2);
    assert_eq!(response.body["dependents"]["classes"], 0);
    assert_eq!(response.body["totalDependents"], 2);

    let still_there = app.get(&format!("/api/majors/{}", major_id), None).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_unused_major(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let major = app.create_major(&token, "TEI").await;
    let uri = format!("/api/majors/{}", id_of(&major));

    let response = app.delete(&uri, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Major deleted successfully");

    let gone = app.get(&uri, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["error"], "Major not found");
}
