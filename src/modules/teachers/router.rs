use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    deactivate_teacher, get_my_teacher_profile, get_teacher, get_teachers, update_teacher,
};

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_teachers))
        .route("/me", get(get_my_teacher_profile))
        .route(
            "/{id}",
            get(get_teacher)
                .patch(update_teacher)
                .delete(deactivate_teacher),
        )
}
