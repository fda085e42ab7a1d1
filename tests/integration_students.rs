mod common;

use axum::http::StatusCode;
use common::{PASSWORD, id_of, setup_test_app};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_student_listing_requires_staff(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let major = app.create_major(&token, "RPL").await;
    let body = app.student_body(&id_of(&major), None);
    let email = body["email"].as_str().unwrap().to_string();
    app.post("/api/auth/register/student", None, body).await;
    let student_token = app.login(&email, PASSWORD).await;

    let forbidden = app.get("/api/students", Some(&student_token)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(
        forbidden.body["error"],
        "Access denied. Required role: ADMIN or TEACHER"
    );

    let me = app.get("/api/students/me", Some(&student_token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["major"]["code"], "RPL");
    assert_eq!(me.body["user"]["email"], email.as_str());
    assert_eq!(me.body["class"], Value::Null);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_student_defaults(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let major = app.create_major(&token, "TKJ").await;

    let response = app.register_student(&id_of(&major), None).await;
    assert_eq!(response.status, StatusCode::CREATED);
    let student = &response.body["user"];
    assert_eq!(student["role"], "STUDENT");
    assert_eq!(student["isActive"], true);
    assert_eq!(student["graduationYear"], Value::Null);
    assert!(student["enrollmentYear"].as_i64().unwrap() >= 2024);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_student_with_unknown_major(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;

    let response = app
        .register_student(&Uuid::new_v4().to_string(), None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "Major not found");

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_student_still_resolves(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let major = app.create_major(&token, "MM").await;
    let registered = app.register_student(&id_of(&major), None).await;
    let uri = format!("/api/students/{}", id_of(&registered.body["user"]));

    let deactivated = app.delete(&uri, Some(&token)).await;
    assert_eq!(deactivated.status, StatusCode::OK);
    assert_eq!(
        deactivated.body["message"],
        "Student Siswa Percobaan deactivated successfully"
    );

    let fetched = app.get(&uri, Some(&token)).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["isActive"], false);

    let inactive = app.get("/api/students?isActive=false", Some(&token)).await;
    assert_eq!(inactive.body["meta"]["total"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_move_student_between_classes(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let year = app.create_academic_year(&token, "2024/2025").await;
    let major = app.create_major(&token, "TKJ").await;
    let (year_id, major_id) = (id_of(&year), id_of(&major));
    let first = app
        .create_class(&token, &year_id, &major_id, 10, "1", None)
        .await;
    let small = app
        .create_class(&token, &year_id, &major_id, 10, "2", Some(1))
        .await;

    app.register_student(&major_id, Some(&id_of(&small))).await;
    let registered = app.register_student(&major_id, Some(&id_of(&first))).await;
    let uri = format!("/api/students/{}", id_of(&registered.body["user"]));

    let into_full = app
        .patch(&uri, Some(&token), json!({ "classId": id_of(&small) }))
        .await;
    assert_eq!(into_full.status, StatusCode::BAD_REQUEST);
    assert_eq!(into_full.body["error"], "Class 10 TKJ 2 is full (1 of 1 students)");

    let resaved = app
        .patch(
            &uri,
            Some(&token),
            json!({ "classId": id_of(&first), "address": "Jl. Kenjeran No. 8" }),
        )
        .await;
    assert_eq!(resaved.status, StatusCode::OK);
    assert_eq!(resaved.body["class"]["name"], "10 TKJ 1");
    assert_eq!(resaved.body["address"], "Jl. Kenjeran No. 8");

    let removed = app
        .patch(&uri, Some(&token), json!({ "classId": null }))
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["classId"], Value::Null);
    assert_eq!(removed.body["class"], Value::Null);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reactivation_needs_a_free_seat(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let year = app.create_academic_year(&token, "2024/2025").await;
    let major = app.create_major(&token, "RPL").await;
    let class = app
        .create_class(&token, &id_of(&year), &id_of(&major), 11, "1", Some(1))
        .await;
    let class_id = id_of(&class);

    let first = app.register_student(&id_of(&major), Some(&class_id)).await;
    let first_uri = format!("/api/students/{}", id_of(&first.body["user"]));
    app.delete(&first_uri, Some(&token)).await;

    let second = app.register_student(&id_of(&major), Some(&class_id)).await;
    assert_eq!(second.status, StatusCode::CREATED);

    let reactivated = app
        .patch(&first_uri, Some(&token), json!({ "isActive": true }))
        .await;
    assert_eq!(reactivated.status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_students(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let major = app.create_major(&token, "TKJ").await;

    let mut body = app.student_body(&id_of(&major), None);
    body["name"] = json!("Dewi Lestari");
    body["nis"] = json!("2024001");
    app.post("/api/auth/register/student", None, body).await;
    app.register_student(&id_of(&major), None).await;

    let by_name = app.get("/api/students?search=lestari", Some(&token)).await;
    assert_eq!(by_name.body["meta"]["total"], 1);
    assert_eq!(by_name.body["data"][0]["nis"], "2024001");

    let by_nis = app.get("/api/students?search=2024001", Some(&token)).await;
    assert_eq!(by_nis.body["meta"]["total"], 1);

    let by_major = app
        .get(
            &format!("/api/students?majorId={}", id_of(&major)),
            Some(&token),
        )
        .await;
    assert_eq!(by_major.body["meta"]["total"], 2);
}

/// A TKJ class for 2024/2025 with a homeroom teacher and two students.
#[sqlx::test(migrations = "./migrations")]
async fn test_tkj_class_scenario(pool: PgPool) {
    let app = setup_test_app(pool).await;
    let token = app.admin_token().await;
    let year = app.create_academic_year(&token, "2024/2025").await;
    let major = app
        .post(
            "/api/majors",
            Some(&token),
            json!({ "code": "TKJ", "name": "Teknik Komputer dan Jaringan" }),
        )
        .await
        .body;
    let (teacher, teacher_token) = app.register_teacher("Bambang Supriyadi").await;

    let class = app
        .post(
            "/api/classes",
            Some(&token),
            json!({
                "academicYearId": id_of(&year),
                "majorId": id_of(&major),
                "grade": 10,
                "section": "1",
                "homeroomTeacherId": id_of(&teacher),
            }),
        )
        .await;
    assert_eq!(class.status, StatusCode::CREATED);
    let class_id = id_of(&class.body);

    for _ in 0..2 {
        let registered = app.register_student(&id_of(&major), Some(&class_id)).await;
        assert_eq!(registered.status, StatusCode::CREATED);
        assert_eq!(registered.body["user"]["class"]["name"], "10 TKJ 1");
    }

    let fetched = app.get(&format!("/api/classes/{}", class_id), None).await;
    assert_eq!(fetched.body["counts"]["students"], 2);
    assert_eq!(fetched.body["homeroomTeacher"]["name"], "Bambang Supriyadi");

    let roster = app
        .get(
            &format!("/api/classes/{}/students", class_id),
            Some(&teacher_token),
        )
        .await;
    assert_eq!(roster.status, StatusCode::OK);
    assert_eq!(roster.body.as_array().unwrap().len(), 2);

    let teacher_view = app
        .get(
            &format!("/api/teachers/{}", id_of(&teacher)),
            Some(&token),
        )
        .await;
    assert_eq!(teacher_view.body["counts"]["homeroomClasses"], 1);

    let major_view = app
        .get(&format!("/api/majors/{}", id_of(&major)), None)
        .await;
    assert_eq!(major_view.body["counts"]["students"], 2);
    assert_eq!(major_view.body["counts"]["classes"], 1);
}
