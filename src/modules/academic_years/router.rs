use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    activate_academic_year, create_academic_year, create_semester, delete_academic_year,
    get_academic_year, get_academic_years,
};

pub fn init_academic_years_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_academic_year).get(get_academic_years))
        .route(
            "/{id}",
            get(get_academic_year).delete(delete_academic_year),
        )
        .route("/{id}/activate", post(activate_academic_year))
        .route("/{id}/semesters", post(create_semester))
}
