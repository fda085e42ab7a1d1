use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_major, delete_major, get_major, get_majors, update_major};

pub fn init_majors_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_major).get(get_majors))
        .route(
            "/{id}",
            get(get_major).patch(update_major).delete(delete_major),
        )
}
