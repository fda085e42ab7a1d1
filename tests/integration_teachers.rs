mod common;

use axum::http::StatusCode;
use common::{id_of, setup_test_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_reads_own_profile(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let (teacher, token) = app.register_teacher("Rina Kusuma").await;

    let me = app.get("/api/teachers/me", Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["id"], teacher["id"]);
    assert_eq!(me.body["user"]["name"], "Rina Kusuma");
    assert_eq!(me.body["counts"]["schedules"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_cannot_use_teacher_me(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;

    let response = app.get("/api/teachers/me", Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_updates_only_own_profile(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let (own, token) = app.register_teacher("Rina Kusuma").await;
    let (other, _) = app.register_teacher("Agus Salim").await;

    let updated = app
        .patch(
            &format!("/api/teachers/{}", id_of(&own)),
            Some(&token),
            json!({ "specialization": "Keamanan Jaringan", "phone": "081298765432" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["specialization"], "Keamanan Jaringan");

    let someone_else = app
        .patch(
            &format!("/api/teachers/{}", id_of(&other)),
            Some(&token),
            json!({ "phone": "081298765432" }),
        )
        .await;
    assert_eq!(someone_else.status, StatusCode::FORBIDDEN);
    assert_eq!(
        someone_else.body["error"],
        "You can only update your own teacher profile"
    );

    let self_deactivate = app
        .patch(
            &format!("/api/teachers/{}", id_of(&own)),
            Some(&token),
            json!({ "isActive": false }),
        )
        .await;
    assert_eq!(self_deactivate.status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivate_teacher(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let admin = app.admin_token().await;
    let (teacher, teacher_token) = app.register_teacher("Agus Salim").await;
    let uri = format!("/api/teachers/{}", id_of(&teacher));

    let as_teacher = app.delete(&uri, Some(&teacher_token)).await;
    assert_eq!(as_teacher.status, StatusCode::FORBIDDEN);

    let response = app.delete(&uri, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "Teacher Agus Salim deactivated successfully"
    );

    let fetched = app.get(&uri, Some(&admin)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["isActive"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_filter_teachers(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let admin = app.admin_token().await;
    let (rina, _) = app.register_teacher("Rina Kusuma").await;
    app.register_teacher("Agus Salim").await;
    app.patch(
        &format!("/api/teachers/{}", id_of(&rina)),
        Some(&admin),
        json!({ "specialization": "Multimedia" }),
    )
    .await;

    let by_specialization = app
        .get("/api/teachers?specialization=multi", Some(&admin))
        .await;
    assert_eq!(by_specialization.status, StatusCode::OK);
    assert_eq!(by_specialization.body["meta"]["total"], 1);
    assert_eq!(by_specialization.body["data"][0]["user"]["name"], "Rina Kusuma");

    let by_name = app.get("/api/teachers?search=agus", Some(&admin)).await;
    assert_eq!(by_name.body["meta"]["total"], 1);

    let all = app.get("/api/teachers", Some(&admin)).await;
    assert_eq!(all.body["meta"]["total"], 2);
}
