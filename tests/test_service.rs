use async_trait::async_trait;
use axum::{Json, Router, extract::State, routing::post};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

use recipe_feedback_be::clients::RecommendationClient;
use recipe_feedback_be::db::FeedbackStore;
use recipe_feedback_be::errors::AppError;
use recipe_feedback_be::models::{
    Feedback, FeedbackCreateRequest, FeedbackUpdateRequest, NewFeedback,
};
use recipe_feedback_be::service;

/// In-memory stand-in for the feedback store, tracking delete calls so the
/// tests can assert which operations reached it.
#[derive(Default)]
struct MemoryStore {
    records: Mutex<HashMap<Uuid, Feedback>>,
    delete_calls: AtomicUsize,
}

impl MemoryStore {
    fn seed(&self, feedback: Feedback) {
        self.records.lock().unwrap().insert(feedback.id, feedback);
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn insert(&self, new: NewFeedback) -> Result<Feedback, AppError> {
        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            recipe_id: new.recipe_id,
            rating: new.rating,
            comment: new.comment,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };
        self.records
            .lock()
            .unwrap()
            .insert(feedback.id, feedback.clone());
        Ok(feedback)
    }

    async fn update(&self, feedback: &Feedback) -> Result<Feedback, AppError> {
        let mut records = self.records.lock().unwrap();
        if !records.contains_key(&feedback.id) {
            return Err(AppError::NotFound(format!(
                "Feedback not found with id: {}",
                feedback.id
            )));
        }
        records.insert(feedback.id, feedback.clone());
        Ok(feedback.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Feedback>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.records.lock().unwrap().contains_key(&id))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        match self.records.lock().unwrap().remove(&id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("Feedback not found with id: {id}"))),
        }
    }

    async fn find_all(&self) -> Result<Vec<Feedback>, AppError> {
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks: Vec<Feedback> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        feedbacks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feedbacks)
    }

    async fn find_by_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks: Vec<Feedback> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.recipe_id == recipe_id)
            .cloned()
            .collect();
        feedbacks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(feedbacks)
    }

    async fn count_by_recipe(&self, recipe_id: &str) -> Result<u64, AppError> {
        Ok(self.find_by_recipe(recipe_id).await?.len() as u64)
    }

    async fn average_rating_by_recipe(&self, recipe_id: &str) -> Result<Option<f64>, AppError> {
        let feedbacks = self.find_by_recipe(recipe_id).await?;
        if feedbacks.is_empty() {
            return Ok(None);
        }
        let sum: i64 = feedbacks.iter().map(|f| f.rating as i64).sum();
        Ok(Some(sum as f64 / feedbacks.len() as f64))
    }

    async fn find_top_n_recent(&self, n: i64) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks: Vec<Feedback> =
            self.records.lock().unwrap().values().cloned().collect();
        feedbacks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        feedbacks.truncate(n as usize);
        Ok(feedbacks)
    }
}

fn create_request(recipe_id: &str, rating: i32) -> FeedbackCreateRequest {
    FeedbackCreateRequest {
        user_id: "user1".to_string(),
        recipe_id: recipe_id.to_string(),
        rating,
        comment: None,
    }
}

fn seeded_feedback(recipe_id: &str, rating: i32, age_offset_secs: i64) -> Feedback {
    let created = Utc::now() + Duration::seconds(age_offset_secs);
    Feedback {
        id: Uuid::new_v4(),
        user_id: "user1".to_string(),
        recipe_id: recipe_id.to_string(),
        rating,
        comment: None,
        created_at: created,
        updated_at: created,
    }
}

#[tokio::test]
async fn test_create_accepts_all_valid_ratings() {
    let store = Arc::new(MemoryStore::default());

    for rating in 1..=5 {
        let response = service::create_feedback(create_request("recipe1", rating), store.clone(), None)
            .await
            .unwrap();
        assert_eq!(response.rating, rating);
    }

    assert_eq!(store.len(), 5);
}

#[tokio::test]
async fn test_create_rejects_out_of_range_ratings() {
    let store = Arc::new(MemoryStore::default());

    for rating in [-1, 0, 6, 42] {
        let result =
            service::create_feedback(create_request("recipe1", rating), store.clone(), None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn test_create_rejects_oversized_comment() {
    let store = Arc::new(MemoryStore::default());

    let mut request = create_request("recipe1", 4);
    request.comment = Some("x".repeat(1001));

    let result = service::create_feedback(request, store.clone(), None).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(store.len(), 0);

    // Exactly the limit is still fine.
    let mut request = create_request("recipe1", 4);
    request.comment = Some("x".repeat(1000));
    service::create_feedback(request, store.clone(), None)
        .await
        .unwrap();
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_average_rating_rounds_half_up() {
    let store = Arc::new(MemoryStore::default());
    store.seed(seeded_feedback("recipe1", 4, 0));
    store.seed(seeded_feedback("recipe1", 5, 1));
    // A different recipe must not leak into the aggregate.
    store.seed(seeded_feedback("recipe2", 1, 2));

    let response = service::get_average_rating("recipe1", store.clone())
        .await
        .unwrap();
    assert_eq!(response.average_rating, 4.5);
    assert_eq!(response.total_feedbacks, 2);

    store.seed(seeded_feedback("recipe3", 4, 0));
    store.seed(seeded_feedback("recipe3", 4, 1));
    store.seed(seeded_feedback("recipe3", 5, 2));

    let response = service::get_average_rating("recipe3", store.clone())
        .await
        .unwrap();
    assert_eq!(response.average_rating, 4.33);
    assert_eq!(response.total_feedbacks, 3);
}

#[tokio::test]
async fn test_average_rating_of_unrated_recipe_is_zero() {
    let store = Arc::new(MemoryStore::default());

    let response = service::get_average_rating("recipe1", store.clone())
        .await
        .unwrap();
    assert_eq!(response.average_rating, 0.0);
    assert_eq!(response.total_feedbacks, 0);
}

#[tokio::test]
async fn test_update_retains_omitted_fields() {
    let store = Arc::new(MemoryStore::default());

    let mut request = create_request("recipe1", 4);
    request.comment = Some("original".to_string());
    let created = service::create_feedback(request, store.clone(), None)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let update = FeedbackUpdateRequest {
        rating: None,
        comment: Some("updated".to_string()),
    };
    let updated = service::update_feedback(&created.id.to_string(), update, store.clone())
        .await
        .unwrap();

    assert_eq!(updated.rating, 4);
    assert_eq!(updated.comment.as_deref(), Some("updated"));
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_update_with_no_fields_only_refreshes_timestamp() {
    let store = Arc::new(MemoryStore::default());

    let created = service::create_feedback(create_request("recipe1", 3), store.clone(), None)
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let updated = service::update_feedback(
        &created.id.to_string(),
        FeedbackUpdateRequest::default(),
        store.clone(),
    )
    .await
    .unwrap();

    assert_eq!(updated.rating, created.rating);
    assert_eq!(updated.comment, created.comment);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
async fn test_update_rejects_invalid_rating() {
    let store = Arc::new(MemoryStore::default());

    let created = service::create_feedback(create_request("recipe1", 3), store.clone(), None)
        .await
        .unwrap();

    let update = FeedbackUpdateRequest {
        rating: Some(0),
        comment: None,
    };
    let result = service::update_feedback(&created.id.to_string(), update, store.clone()).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let unchanged = service::get_feedback_by_id(&created.id.to_string(), store.clone())
        .await
        .unwrap();
    assert_eq!(unchanged.rating, 3);
}

#[tokio::test]
async fn test_update_missing_id_is_not_found() {
    let store = Arc::new(MemoryStore::default());

    let result = service::update_feedback(
        &Uuid::new_v4().to_string(),
        FeedbackUpdateRequest::default(),
        store.clone(),
    )
    .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_missing_id_issues_no_store_delete() {
    let store = Arc::new(MemoryStore::default());

    let result = service::delete_feedback(&Uuid::new_v4().to_string(), store.clone()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_delete_removes_the_record() {
    let store = Arc::new(MemoryStore::default());

    let created = service::create_feedback(create_request("recipe1", 5), store.clone(), None)
        .await
        .unwrap();

    service::delete_feedback(&created.id.to_string(), store.clone())
        .await
        .unwrap();

    let result = service::get_feedback_by_id(&created.id.to_string(), store.clone()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.delete_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_get_with_malformed_id_is_not_found() {
    let store = Arc::new(MemoryStore::default());

    let result = service::get_feedback_by_id("not-a-uuid", store.clone()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_list_by_user_is_most_recent_first() {
    let store = Arc::new(MemoryStore::default());
    store.seed(seeded_feedback("recipe1", 3, 0));
    store.seed(seeded_feedback("recipe2", 4, 10));
    store.seed(seeded_feedback("recipe3", 5, 5));

    let feedbacks = service::get_feedbacks_by_user("user1", store.clone())
        .await
        .unwrap();

    assert_eq!(feedbacks.len(), 3);
    assert!(feedbacks[0].created_at > feedbacks[1].created_at);
    assert!(feedbacks[1].created_at > feedbacks[2].created_at);
}

type CapturedBatches = Arc<Mutex<Vec<Vec<Feedback>>>>;

async fn capture_handler(
    State(captured): State<CapturedBatches>,
    Json(batch): Json<Vec<Feedback>>,
) -> &'static str {
    captured.lock().unwrap().push(batch);
    "ok"
}

/// Spawns a local listener standing in for the recommendation service and
/// returns its base url.
async fn spawn_recommendation_stub(captured: CapturedBatches) -> String {
    let app = Router::new()
        .route("/api/recommendations/update-model", post(capture_handler))
        .with_state(captured);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn test_forward_with_no_feedbacks_makes_no_call() {
    let store = Arc::new(MemoryStore::default());

    // Nothing listens on this port; the call only succeeds because no
    // request is ever made.
    let recommendation = RecommendationClient::new("http://127.0.0.1:9".to_string());

    let count = service::forward_recent_feedbacks(store.clone(), &recommendation)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_forward_sends_exactly_the_100_most_recent() {
    let store = Arc::new(MemoryStore::default());
    for i in 0..150 {
        store.seed(seeded_feedback("recipe1", 4, i));
    }

    let captured: CapturedBatches = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_recommendation_stub(captured.clone()).await;
    let recommendation = RecommendationClient::new(base_url);

    let count = service::forward_recent_feedbacks(store.clone(), &recommendation)
        .await
        .unwrap();
    assert_eq!(count, 100);

    let batches = captured.lock().unwrap();
    assert_eq!(batches.len(), 1);

    let batch = &batches[0];
    assert_eq!(batch.len(), 100);

    // The newest 100 were seeded with offsets 50..150.
    let cutoff = store
        .find_top_n_recent(100)
        .await
        .unwrap()
        .last()
        .unwrap()
        .created_at;
    assert!(batch.iter().all(|f| f.created_at >= cutoff));
    assert!(batch.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn test_forward_failure_is_downstream_unavailable() {
    let store = Arc::new(MemoryStore::default());
    store.seed(seeded_feedback("recipe1", 4, 0));

    let recommendation = RecommendationClient::new("http://127.0.0.1:9".to_string());

    let result = service::forward_recent_feedbacks(store.clone(), &recommendation).await;
    match result {
        Err(AppError::DownstreamUnavailable(msg)) => {
            // Operators need the target url to diagnose the outage.
            assert!(msg.contains("/api/recommendations/update-model"));
        }
        other => panic!("Expected DownstreamUnavailable, got {other:?}"),
    }
}
