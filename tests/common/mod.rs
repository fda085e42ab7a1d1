#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use sekolah::router::init_router;
use sekolah::sekolah_config::{CorsConfig, SessionConfig};
use sekolah::state::AppState;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "rahasia123";

pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub async fn setup_test_app(pool: PgPool) -> TestApp {
    let state = AppState::new(pool.clone(), SessionConfig::default(), CorsConfig::default());
    TestApp {
        router: init_router(state),
        pool,
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@test.sch.id", prefix, Uuid::new_v4().simple())
}

/// Digits only, `len` long, unique enough for NIS/NISN/NIP/NIK columns.
pub fn unique_digits(len: usize) -> String {
    let digits: String = Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .rev()
        .take(len)
        .collect();
    format!("{:0>width$}", digits, width = len)
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body["sessionToken"].as_str().unwrap().to_string()
    }

    /// Registers a fresh admin and returns a session token for it.
    pub async fn admin_token(&self) -> String {
        let email = unique_email("admin");
        let response = self
            .post(
                "/api/auth/register/admin",
                None,
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "name": "Admin Sekolah",
                    "position": "Kepala Sekolah",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        self.login(&email, PASSWORD).await
    }

    /// Registers a teacher; returns the profile and a session token.
    pub async fn register_teacher(&self, name: &str) -> (Value, String) {
        let email = unique_email("guru");
        let response = self
            .post(
                "/api/auth/register/teacher",
                None,
                json!({
                    "email": email,
                    "password": PASSWORD,
                    "name": name,
                    "nip": unique_digits(18),
                    "dateOfBirth": "1985-03-12",
                    "placeOfBirth": "Surabaya",
                    "gender": "FEMALE",
                    "address": "Jl. Pemuda No. 10",
                    "phone": "081234567890",
                    "specialization": "Jaringan Komputer",
                    "hireDate": "2015-07-13",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        let token = self.login(&email, PASSWORD).await;
        (response.body["user"].clone(), token)
    }

    pub fn student_body(&self, major_id: &str, class_id: Option<&str>) -> Value {
        json!({
            "email": unique_email("siswa"),
            "password": PASSWORD,
            "name": "Siswa Percobaan",
            "nis": unique_digits(9),
            "nisn": unique_digits(10),
            "majorId": major_id,
            "classId": class_id,
            "dateOfBirth": "2008-05-17",
            "placeOfBirth": "Sidoarjo",
            "gender": "MALE",
            "address": "Jl. Diponegoro No. 5",
        })
    }

    /// Registers a student and returns the `RegisterResponse` response.
    pub async fn register_student(&self, major_id: &str, class_id: Option<&str>) -> TestResponse {
        self.post(
            "/api/auth/register/student",
            None,
            self.student_body(major_id, class_id),
        )
        .await
    }

    pub async fn create_major(&self, token: &str, code: &str) -> Value {
        let response = self
            .post(
                "/api/majors",
                Some(token),
                json!({ "code": code, "name": format!("Jurusan {}", code) }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }

    pub async fn create_academic_year(&self, token: &str, year: &str) -> Value {
        let (first, second) = year.split_once('/').unwrap();
        let response = self
            .post(
                "/api/academic-years",
                Some(token),
                json!({
                    "year": year,
                    "startDate": format!("{}-07-15", first),
                    "endDate": format!("{}-06-30", second),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }

    pub async fn create_class(
        &self,
        token: &str,
        academic_year_id: &str,
        major_id: &str,
        grade: i16,
        section: &str,
        max_students: Option<i32>,
    ) -> Value {
        let response = self
            .post(
                "/api/classes",
                Some(token),
                json!({
                    "academicYearId": academic_year_id,
                    "majorId": major_id,
                    "grade": grade,
                    "section": section,
                    "maxStudents": max_students,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}
