mod common;

use axum::http::StatusCode;
use common::{id_of, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_subject_with_defaults(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;

    let response = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "MTK", "name": "Matematika" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["credits"], 2);
    assert_eq!(response.body["isCore"], false);
    assert_eq!(response.body["major"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_subject_code_conflicts(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let first = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "BIN", "name": "Bahasa Indonesia" }),
        )
        .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let response = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "BIN", "name": "Bahasa Inggris" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "A subject with this code already exists");

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subjects WHERE code = 'BIN'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_recoding_subject_onto_taken_code_conflicts(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    app.post(
        "/api/subjects",
        Some(&token),
        json!({ "code": "MTK", "name": "Matematika" }),
    )
    .await;
    let physics = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "FIS", "name": "Fisika" }),
        )
        .await;

    let response = app
        .patch(
            &format!("/api/subjects/{}", id_of(&physics.body)),
            Some(&token),
            json!({ "code": "MTK" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let unchanged = app
        .get(&format!("/api/subjects/{}", id_of(&physics.body)), None)
        .await;
    assert_eq!(unchanged.body["code"], "FIS");
    let listing = app.get("/api/subjects?search=MTK", None).await;
    assert_eq!(listing.body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subject_with_unknown_major(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;

    let response = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "RPL-WEB", "name": "Pemrograman Web", "majorId": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Major not found");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_subject_credits_validated(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;

    let response = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "PJOK", "name": "Olahraga", "credits": 12 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["fields"][0]["field"], "credits");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_filter_subjects_by_major(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let rpl = app.create_major(&token, "RPL").await;

    app.post(
        "/api/subjects",
        Some(&token),
        json!({ "code": "BIND", "name": "Bahasa Indonesia", "isCore": true }),
    )
    .await;
    let web = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({
                "code": "RPL-PEMWEB",
                "name": "Pemrograman Web",
                "majorId": id_of(&rpl),
                "credits": 6,
            }),
        )
        .await;
    assert_eq!(web.body["major"]["code"], "RPL");

    let by_major = app
        .get(&format!("/api/subjects?majorId={}", id_of(&rpl)), None)
        .await;
    assert_eq!(by_major.body["meta"]["total"], 1);
    assert_eq!(by_major.body["data"][0]["code"], "RPL-PEMWEB");

    let core = app.get("/api/subjects?isCore=true", None).await;
    assert_eq!(core.body["meta"]["total"], 1);
    assert_eq!(core.body["data"][0]["code"], "BIND");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_detach_subject_from_major(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let mm = app.create_major(&token, "MM").await;
    let subject = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "MM-DG", "name": "Desain Grafis", "majorId": id_of(&mm) }),
        )
        .await
        .body;

    let response = app
        .patch(
            &format!("/api/subjects/{}", id_of(&subject)),
            Some(&token),
            json!({ "majorId": null }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["majorId"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_subject_blocked_by_schedules(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = app.admin_token().await;
    let major = app.create_major(&token, "TKJ").await;
    let year = app.create_academic_year(&token, "2024/2025").await;
    let class = app
        .create_class(&token, &id_of(&year), &id_of(&major), 10, "1", None)
        .await;
    let (teacher, _) = app.register_teacher("Guru Jaringan").await;
    let subject = app
        .post(
            "/api/subjects",
            Some(&token),
            json!({ "code": "TKJ-JARKOM", "name": "Jaringan Komputer" }),
        )
        .await
        .body;

    sqlx::query(
        r#"INSERT INTO schedules (class_id, subject_id, teacher_id, day_of_week, start_time, end_time)
           VALUES ($1::uuid, $2::uuid, $3::uuid, 1, '07:00', '08:30')"#,
    )
    .bind(id_of(&class))
    .bind(id_of(&subject))
    .bind(id_of(&teacher))
    .execute(&pool)
    .await
    .unwrap();

    let response = app
        .delete(&format!("/api/subjects/{}", id_of(&subject)), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["dependents"]["schedules"], 1);
    assert_eq!(response.body["totalDependents"], 1);
}
