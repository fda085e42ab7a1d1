use axum::{Router, routing::get};

use crate::modules::students::controller::{
    deactivate_student, get_my_student_profile, get_student, get_students, update_student,
};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_students))
        .route("/me", get(get_my_student_profile))
        .route(
            "/{id}",
            get(get_student)
                .patch(update_student)
                .delete(deactivate_student),
        )
}
