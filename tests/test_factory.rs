use chrono::Utc;
use recipe_feedback_be::models::{Feedback, FeedbackCreateRequest};
use recipe_feedback_be::service::factory::{
    average_response, merge_update, round_two_decimals, to_entity, to_response, to_response_list,
};
use uuid::Uuid;

fn sample_feedback() -> Feedback {
    let now = Utc::now();
    Feedback {
        id: Uuid::new_v4(),
        user_id: "user1".to_string(),
        recipe_id: "recipe1".to_string(),
        rating: 4,
        comment: Some("Great recipe".to_string()),
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_to_entity_stamps_both_timestamps() {
    let request = FeedbackCreateRequest {
        user_id: "user1".to_string(),
        recipe_id: "recipe1".to_string(),
        rating: 5,
        comment: Some("Delicious".to_string()),
    };

    let entity = to_entity(&request);

    assert_eq!(entity.user_id, "user1");
    assert_eq!(entity.recipe_id, "recipe1");
    assert_eq!(entity.rating, 5);
    assert_eq!(entity.comment.as_deref(), Some("Delicious"));
    assert_eq!(entity.created_at, entity.updated_at);
}

#[test]
fn test_create_round_trip_preserves_fields() {
    let request = FeedbackCreateRequest {
        user_id: "user42".to_string(),
        recipe_id: "recipe7".to_string(),
        rating: 3,
        comment: None,
    };

    let entity = to_entity(&request);

    // The store assigns the id; everything else passes through untouched.
    let stored = Feedback {
        id: Uuid::new_v4(),
        user_id: entity.user_id,
        recipe_id: entity.recipe_id,
        rating: entity.rating,
        comment: entity.comment,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    };

    let response = to_response(stored.clone());

    assert_eq!(response.id, stored.id);
    assert_eq!(response.user_id, "user42");
    assert_eq!(response.recipe_id, "recipe7");
    assert_eq!(response.rating, 3);
    assert_eq!(response.comment, None);
    assert_eq!(response.created_at, stored.created_at);
    assert_eq!(response.updated_at, stored.updated_at);
}

#[test]
fn test_to_response_list_empty_input() {
    let responses = to_response_list(Vec::new());
    assert!(responses.is_empty());
}

#[test]
fn test_merge_update_overwrites_present_fields() {
    let original = sample_feedback();

    std::thread::sleep(std::time::Duration::from_millis(5));
    let merged = merge_update(&original, Some(2), Some("Too sweet".to_string()));

    assert_eq!(merged.rating, 2);
    assert_eq!(merged.comment.as_deref(), Some("Too sweet"));
    assert_eq!(merged.id, original.id);
    assert_eq!(merged.user_id, original.user_id);
    assert_eq!(merged.recipe_id, original.recipe_id);
    assert_eq!(merged.created_at, original.created_at);
    assert!(merged.updated_at > original.updated_at);
}

#[test]
fn test_merge_update_retains_omitted_fields() {
    let original = sample_feedback();

    let merged = merge_update(&original, None, Some("Changed my mind".to_string()));

    assert_eq!(merged.rating, original.rating);
    assert_eq!(merged.comment.as_deref(), Some("Changed my mind"));
}

#[test]
fn test_merge_update_with_nothing_only_refreshes_timestamp() {
    let original = sample_feedback();

    std::thread::sleep(std::time::Duration::from_millis(5));
    let merged = merge_update(&original, None, None);

    assert_eq!(merged.rating, original.rating);
    assert_eq!(merged.comment, original.comment);
    assert_eq!(merged.created_at, original.created_at);
    assert!(merged.updated_at > original.updated_at);
}

#[test]
fn test_round_two_decimals_half_up() {
    assert_eq!(round_two_decimals(4.5), 4.5);
    assert_eq!(round_two_decimals(13.0 / 3.0), 4.33);
    assert_eq!(round_two_decimals(14.0 / 3.0), 4.67);
    assert_eq!(round_two_decimals(0.0), 0.0);
}

#[test]
fn test_average_response_rounds_and_defaults() {
    let response = average_response("recipe1", Some(13.0 / 3.0), 3);
    assert_eq!(response.recipe_id, "recipe1");
    assert_eq!(response.average_rating, 4.33);
    assert_eq!(response.total_feedbacks, 3);

    let empty = average_response("recipe2", None, 0);
    assert_eq!(empty.average_rating, 0.0);
    assert_eq!(empty.total_feedbacks, 0);
}
