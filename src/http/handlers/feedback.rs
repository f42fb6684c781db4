use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    models::{
        AverageRatingResponse, FeedbackCreateRequest, FeedbackResponse, FeedbackUpdateRequest,
    },
    service,
    state::AppState,
};

pub async fn create_feedback_handler(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackCreateRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), (StatusCode, String)> {
    match service::create_feedback(payload, state.store.clone(), state.reference_checker.as_ref())
        .await
    {
        Ok(response) => {
            tracing::info!("Feedback created with id: {}", response.id);
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => {
            tracing::error!("Error creating feedback: {}", err);
            Err(err.to_response())
        }
    }
}

pub async fn get_all_feedbacks_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<FeedbackResponse>>, (StatusCode, String)> {
    let feedbacks = service::get_all_feedbacks(state.store.clone())
        .await
        .map_err(|e| {
            tracing::error!("Error retrieving feedbacks: {}", e);
            e.to_response()
        })?;

    Ok(Json(feedbacks))
}

pub async fn get_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FeedbackResponse>, (StatusCode, String)> {
    let feedback = service::get_feedback_by_id(&id, state.store.clone())
        .await
        .map_err(|e| {
            tracing::error!("Error retrieving feedback {}: {}", id, e);
            e.to_response()
        })?;

    Ok(Json(feedback))
}

pub async fn get_feedbacks_by_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<FeedbackResponse>>, (StatusCode, String)> {
    let feedbacks = service::get_feedbacks_by_user(&user_id, state.store.clone())
        .await
        .map_err(|e| {
            tracing::error!("Error retrieving feedbacks for user {}: {}", user_id, e);
            e.to_response()
        })?;

    Ok(Json(feedbacks))
}

pub async fn get_feedbacks_by_recipe_handler(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> Result<Json<Vec<FeedbackResponse>>, (StatusCode, String)> {
    let feedbacks = service::get_feedbacks_by_recipe(&recipe_id, state.store.clone())
        .await
        .map_err(|e| {
            tracing::error!("Error retrieving feedbacks for recipe {}: {}", recipe_id, e);
            e.to_response()
        })?;

    Ok(Json(feedbacks))
}

pub async fn get_average_rating_handler(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> Result<Json<AverageRatingResponse>, (StatusCode, String)> {
    let average = service::get_average_rating(&recipe_id, state.store.clone())
        .await
        .map_err(|e| {
            tracing::error!("Error computing average rating for recipe {}: {}", recipe_id, e);
            e.to_response()
        })?;

    Ok(Json(average))
}

pub async fn update_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<FeedbackUpdateRequest>,
) -> Result<Json<FeedbackResponse>, (StatusCode, String)> {
    match service::update_feedback(&id, payload, state.store.clone()).await {
        Ok(response) => {
            tracing::info!("Feedback updated with id: {}", response.id);
            Ok(Json(response))
        }
        Err(err) => {
            tracing::error!("Error updating feedback {}: {}", id, err);
            Err(err.to_response())
        }
    }
}

pub async fn delete_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    match service::delete_feedback(&id, state.store.clone()).await {
        Ok(()) => {
            tracing::info!("Feedback deleted with id: {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            tracing::error!("Error deleting feedback {}: {}", id, err);
            Err(err.to_response())
        }
    }
}

pub async fn send_to_recommendation_handler(
    State(state): State<AppState>,
) -> Result<Json<String>, (StatusCode, String)> {
    match service::forward_recent_feedbacks(state.store.clone(), &state.recommendation).await {
        Ok(count) => Ok(Json(format!(
            "Forwarded {count} feedbacks to the recommendation service"
        ))),
        Err(err) => {
            tracing::warn!("Recommendation service not reachable: {}", err);
            Err(err.to_response())
        }
    }
}

pub async fn health_handler() -> &'static str {
    "Feedback service is healthy"
}
