use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    get_me, get_session, login, logout, register_admin, register_parent, register_student,
    register_teacher,
};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register/student", post(register_student))
        .route("/register/teacher", post(register_teacher))
        .route("/register/parent", post(register_parent))
        .route("/register/admin", post(register_admin))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(get_session))
        .route("/me", get(get_me))
}
