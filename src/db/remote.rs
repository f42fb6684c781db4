use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    clients::PersistenceClient,
    db::{FeedbackStore, sort_most_recent_first},
    errors::AppError,
    models::{Feedback, NewFeedback},
};

/// Storage backend where persistence itself lives behind a sibling HTTP
/// service. The persistence API has no count or average endpoints, so those
/// are reductions over the fetched recipe set.
pub struct RemoteStore {
    client: PersistenceClient,
}

impl RemoteStore {
    pub fn new(client: PersistenceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedbackStore for RemoteStore {
    async fn insert(&self, new: NewFeedback) -> Result<Feedback, AppError> {
        self.client.create_feedback(&new).await
    }

    async fn update(&self, feedback: &Feedback) -> Result<Feedback, AppError> {
        self.client.update_feedback(feedback).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Feedback>, AppError> {
        self.client.get_feedback_by_id(id).await
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let feedback = self.client.get_feedback_by_id(id).await?;

        Ok(feedback.is_some())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), AppError> {
        self.client.delete_feedback(id).await
    }

    async fn find_all(&self) -> Result<Vec<Feedback>, AppError> {
        self.client.get_all_feedbacks().await
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks = self.client.get_feedbacks_by_user(user_id).await?;
        sort_most_recent_first(&mut feedbacks);

        Ok(feedbacks)
    }

    async fn find_by_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks = self.client.get_feedbacks_by_recipe(recipe_id).await?;
        sort_most_recent_first(&mut feedbacks);

        Ok(feedbacks)
    }

    async fn count_by_recipe(&self, recipe_id: &str) -> Result<u64, AppError> {
        let feedbacks = self.client.get_feedbacks_by_recipe(recipe_id).await?;

        Ok(feedbacks.len() as u64)
    }

    async fn average_rating_by_recipe(&self, recipe_id: &str) -> Result<Option<f64>, AppError> {
        let feedbacks = self.client.get_feedbacks_by_recipe(recipe_id).await?;

        if feedbacks.is_empty() {
            return Ok(None);
        }

        let sum: i64 = feedbacks.iter().map(|f| f.rating as i64).sum();

        Ok(Some(sum as f64 / feedbacks.len() as f64))
    }

    async fn find_top_n_recent(&self, n: i64) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks = self.client.get_all_feedbacks().await?;
        sort_most_recent_first(&mut feedbacks);
        feedbacks.truncate(n as usize);

        Ok(feedbacks)
    }
}
