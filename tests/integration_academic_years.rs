mod common;

use axum::http::StatusCode;
use common::{id_of, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_year_rejects_bad_label_and_dates(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;

    let bad_label = app
        .post(
            "/api/academic-years",
            Some(&token),
            json!({ "year": "2024/2026", "startDate": "2024-07-15", "endDate": "2025-06-30" }),
        )
        .await;
    assert_eq!(bad_label.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_label.body["fields"][0]["field"], "year");

    let reversed = app
        .post(
            "/api/academic-years",
            Some(&token),
            json!({ "year": "2024/2025", "startDate": "2025-06-30", "endDate": "2024-07-15" }),
        )
        .await;
    assert_eq!(reversed.status, StatusCode::BAD_REQUEST);
    assert_eq!(reversed.body["error"], "Start date must be before end date");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_year_conflicts(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    app.create_academic_year(&token, "2024/2025").await;

    let response = app
        .post(
            "/api/academic-years",
            Some(&token),
            json!({ "year": "2024/2025", "startDate": "2024-07-15", "endDate": "2025-06-30" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_one_year_is_active(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let first = app.create_academic_year(&token, "2023/2024").await;
    let second = app.create_academic_year(&token, "2024/2025").await;

    let activated = app
        .post(
            &format!("/api/academic-years/{}/activate", id_of(&first)),
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(activated.status, StatusCode::OK);
    assert_eq!(activated.body["isActive"], true);

    app.post(
        &format!("/api/academic-years/{}/activate", id_of(&second)),
        Some(&token),
        json!({}),
    )
    .await;

    let active = app.get("/api/academic-years?isActive=true", None).await;
    assert_eq!(active.body["meta"]["total"], 1);
    assert_eq!(active.body["data"][0]["year"], "2024/2025");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_semesters_stay_inside_year(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let year = app.create_academic_year(&token, "2024/2025").await;
    let uri = format!("/api/academic-years/{}/semesters", id_of(&year));

    let outside = app
        .post(
            &uri,
            Some(&token),
            json!({ "type": "GENAP", "startDate": "2025-01-06", "endDate": "2025-08-30" }),
        )
        .await;
    assert_eq!(outside.status, StatusCode::BAD_REQUEST);

    let genap = app
        .post(
            &uri,
            Some(&token),
            json!({ "type": "GENAP", "startDate": "2025-01-06", "endDate": "2025-06-30" }),
        )
        .await;
    assert_eq!(genap.status, StatusCode::CREATED);

    let ganjil = app
        .post(
            &uri,
            Some(&token),
            json!({
                "type": "GANJIL",
                "startDate": "2024-07-15",
                "endDate": "2024-12-31",
                "isActive": true,
            }),
        )
        .await;
    assert_eq!(ganjil.status, StatusCode::CREATED);

    let duplicate = app
        .post(
            &uri,
            Some(&token),
            json!({ "type": "GANJIL", "startDate": "2024-07-15", "endDate": "2024-12-31" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let fetched = app
        .get(&format!("/api/academic-years/{}", id_of(&year)), None)
        .await;
    let semesters = fetched.body["semesters"].as_array().unwrap();
    assert_eq!(semesters.len(), 2);
    assert_eq!(semesters[0]["type"], "GANJIL");
    assert_eq!(semesters[0]["isActive"], true);
    assert_eq!(semesters[1]["type"], "GENAP");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_year_blocked_by_classes(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let year = app.create_academic_year(&token, "2024/2025").await;
    let major = app.create_major(&token, "TKJ").await;
    app.create_class(&token, &id_of(&year), &id_of(&major), 10, "1", None)
        .await;

    let response = app
        .delete(&format!("/api/academic-years/{}", id_of(&year)), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["dependents"]["classes"], 1);
    assert_eq!(response.body["dependents"]["grades"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_empty_year_removes_semesters(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = app.admin_token().await;
    let year = app.create_academic_year(&token, "2024/2025").await;
    app.post(
        &format!("/api/academic-years/{}/semesters", id_of(&year)),
        Some(&token),
        json!({ "type": "GANJIL", "startDate": "2024-07-15", "endDate": "2024-12-31" }),
    )
    .await;

    let response = app
        .delete(&format!("/api/academic-years/{}", id_of(&year)), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let semesters: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM semesters")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(semesters, 0);
}
