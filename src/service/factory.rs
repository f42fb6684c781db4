//! Pure construction and mapping functions for feedback records. Everything
//! here is side-effect-free apart from reading the clock.

use chrono::Utc;

use crate::models::{
    AverageRatingResponse, Feedback, FeedbackCreateRequest, FeedbackResponse, NewFeedback,
};

/// Builds the entity for a create request, stamping both timestamps with the
/// same instant. The id stays unassigned until the store persists it.
pub fn to_entity(request: &FeedbackCreateRequest) -> NewFeedback {
    let now = Utc::now();

    NewFeedback {
        user_id: request.user_id.clone(),
        recipe_id: request.recipe_id.clone(),
        rating: request.rating,
        comment: request.comment.clone(),
        created_at: now,
        updated_at: now,
    }
}

pub fn to_response(feedback: Feedback) -> FeedbackResponse {
    FeedbackResponse {
        id: feedback.id,
        user_id: feedback.user_id,
        recipe_id: feedback.recipe_id,
        rating: feedback.rating,
        comment: feedback.comment,
        created_at: feedback.created_at,
        updated_at: feedback.updated_at,
    }
}

pub fn to_response_list(feedbacks: Vec<Feedback>) -> Vec<FeedbackResponse> {
    feedbacks.into_iter().map(to_response).collect()
}

/// Applies a partial update: a present field overwrites, an omitted field
/// retains the stored value. Identity fields and `created_at` never change;
/// `updated_at` is refreshed even when the effective values are identical.
pub fn merge_update(
    original: &Feedback,
    new_rating: Option<i32>,
    new_comment: Option<String>,
) -> Feedback {
    Feedback {
        id: original.id,
        user_id: original.user_id.clone(),
        recipe_id: original.recipe_id.clone(),
        rating: new_rating.unwrap_or(original.rating),
        comment: new_comment.or_else(|| original.comment.clone()),
        created_at: original.created_at,
        updated_at: Utc::now(),
    }
}

/// A recipe with no feedbacks reports an average of 0.0 over a count of 0.
pub fn average_response(
    recipe_id: &str,
    average: Option<f64>,
    total: u64,
) -> AverageRatingResponse {
    AverageRatingResponse {
        recipe_id: recipe_id.to_string(),
        average_rating: average.map(round_two_decimals).unwrap_or(0.0),
        total_feedbacks: total,
    }
}

/// Round half up to two decimal places.
pub fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
