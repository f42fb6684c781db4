use std::sync::Arc;
use uuid::Uuid;

use crate::{
    clients::{PersistenceClient, RecommendationClient},
    db::FeedbackStore,
    errors::AppError,
    models::{AverageRatingResponse, FeedbackCreateRequest, FeedbackResponse, FeedbackUpdateRequest},
    service::factory,
};

const MIN_RATING: i32 = 1;
const MAX_RATING: i32 = 5;
const MAX_COMMENT_CHARS: usize = 1000;
const FORWARD_BATCH_LIMIT: i64 = 100;

pub async fn create_feedback(
    request: FeedbackCreateRequest,
    store: Arc<dyn FeedbackStore>,
    reference_checker: Option<&PersistenceClient>,
) -> Result<FeedbackResponse, AppError> {
    tracing::info!("Creating feedback for recipe: {}", request.recipe_id);

    validate_rating(request.rating)?;
    if let Some(comment) = &request.comment {
        validate_comment(comment)?;
    }

    // Nothing is persisted until both references resolve.
    if let Some(checker) = reference_checker {
        if !checker.user_exists(&request.user_id).await? {
            return Err(AppError::ReferenceNotFound(format!(
                "User not found with id: {}",
                request.user_id
            )));
        }

        if !checker.recipe_exists(&request.recipe_id).await? {
            return Err(AppError::ReferenceNotFound(format!(
                "Recipe not found with id: {}",
                request.recipe_id
            )));
        }
    }

    let saved = store.insert(factory::to_entity(&request)).await?;

    tracing::info!("Feedback created with id: {}", saved.id);

    Ok(factory::to_response(saved))
}

pub async fn get_feedback_by_id(
    id: &str,
    store: Arc<dyn FeedbackStore>,
) -> Result<FeedbackResponse, AppError> {
    let feedback_id = parse_feedback_id(id)?;

    let feedback = store
        .find_by_id(feedback_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback not found with id: {id}")))?;

    Ok(factory::to_response(feedback))
}

pub async fn get_all_feedbacks(
    store: Arc<dyn FeedbackStore>,
) -> Result<Vec<FeedbackResponse>, AppError> {
    let feedbacks = store.find_all().await?;

    Ok(factory::to_response_list(feedbacks))
}

pub async fn get_feedbacks_by_user(
    user_id: &str,
    store: Arc<dyn FeedbackStore>,
) -> Result<Vec<FeedbackResponse>, AppError> {
    let feedbacks = store.find_by_user(user_id).await?;

    Ok(factory::to_response_list(feedbacks))
}

pub async fn get_feedbacks_by_recipe(
    recipe_id: &str,
    store: Arc<dyn FeedbackStore>,
) -> Result<Vec<FeedbackResponse>, AppError> {
    let feedbacks = store.find_by_recipe(recipe_id).await?;

    Ok(factory::to_response_list(feedbacks))
}

pub async fn get_average_rating(
    recipe_id: &str,
    store: Arc<dyn FeedbackStore>,
) -> Result<AverageRatingResponse, AppError> {
    let average = store.average_rating_by_recipe(recipe_id).await?;
    let total = store.count_by_recipe(recipe_id).await?;

    Ok(factory::average_response(recipe_id, average, total))
}

pub async fn update_feedback(
    id: &str,
    request: FeedbackUpdateRequest,
    store: Arc<dyn FeedbackStore>,
) -> Result<FeedbackResponse, AppError> {
    tracing::info!("Updating feedback with id: {}", id);

    if let Some(rating) = request.rating {
        validate_rating(rating)?;
    }
    if let Some(comment) = &request.comment {
        validate_comment(comment)?;
    }

    let feedback_id = parse_feedback_id(id)?;

    let original = store
        .find_by_id(feedback_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback not found with id: {id}")))?;

    let merged = factory::merge_update(&original, request.rating, request.comment);
    let saved = store.update(&merged).await?;

    Ok(factory::to_response(saved))
}

pub async fn delete_feedback(id: &str, store: Arc<dyn FeedbackStore>) -> Result<(), AppError> {
    tracing::info!("Deleting feedback with id: {}", id);

    let feedback_id = parse_feedback_id(id)?;

    if !store.exists_by_id(feedback_id).await? {
        return Err(AppError::NotFound(format!("Feedback not found with id: {id}")));
    }

    store.delete_by_id(feedback_id).await
}

/// Sends the most recently created feedbacks to the recommendation service.
/// An empty store is a no-op with no network call. Returns the number of
/// feedbacks forwarded.
pub async fn forward_recent_feedbacks(
    store: Arc<dyn FeedbackStore>,
    recommendation: &RecommendationClient,
) -> Result<usize, AppError> {
    let recent = store.find_top_n_recent(FORWARD_BATCH_LIMIT).await?;

    if recent.is_empty() {
        tracing::info!("No feedbacks to forward to the recommendation service");
        return Ok(0);
    }

    let count = recent.len();
    recommendation.submit_batch(&recent).await?;

    tracing::info!("Forwarded {} feedbacks to the recommendation service", count);

    Ok(count)
}

// A structurally invalid id can never match a stored record.
fn parse_feedback_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id)
        .map_err(|_| AppError::NotFound(format!("Invalid feedback id format: {id}")))
}

fn validate_rating(rating: i32) -> Result<(), AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::validation("rating", "must be between 1 and 5"));
    }

    Ok(())
}

fn validate_comment(comment: &str) -> Result<(), AppError> {
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::validation(
            "comment",
            "must be at most 1000 characters",
        ));
    }

    Ok(())
}
