use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    http::handlers::{
        create_feedback_handler, delete_feedback_handler, get_all_feedbacks_handler,
        get_average_rating_handler, get_feedback_handler, get_feedbacks_by_recipe_handler,
        get_feedbacks_by_user_handler, health_handler, send_to_recommendation_handler,
        update_feedback_handler,
    },
    state::AppState,
};

pub fn create_http_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/feedbacks",
            post(create_feedback_handler).get(get_all_feedbacks_handler),
        )
        .route("/api/feedbacks/health", get(health_handler))
        .route(
            "/api/feedbacks/send-to-recommendation",
            post(send_to_recommendation_handler),
        )
        .route(
            "/api/feedbacks/{id}",
            get(get_feedback_handler)
                .put(update_feedback_handler)
                .delete(delete_feedback_handler),
        )
        .route("/api/feedbacks/user/{user_id}", get(get_feedbacks_by_user_handler))
        .route(
            "/api/feedbacks/recipe/{recipe_id}",
            get(get_feedbacks_by_recipe_handler),
        )
        .route(
            "/api/feedbacks/recipe/{recipe_id}/average",
            get(get_average_rating_handler),
        )
        .with_state(state)
}
