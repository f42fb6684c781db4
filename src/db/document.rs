use async_trait::async_trait;
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::{
    db::{FeedbackStore, sort_most_recent_first},
    errors::AppError,
    models::{Feedback, NewFeedback, redis::RedisKey},
    state::RedisClient,
};

/// Document backend keeping each feedback as a JSON value under
/// `feedback:{id}`. Filtering, ordering and aggregation happen in memory
/// over the scanned set.
pub struct DocumentStore {
    redis: RedisClient,
}

impl DocumentStore {
    pub async fn connect(redis_url: &str) -> Result<Self, AppError> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(AppError::RedisCommandError)?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(AppError::RedisCommandError)?;

        Ok(Self { redis: pool })
    }

    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    async fn conn(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, AppError> {
        self.redis.get().await.map_err(|e| match e {
            bb8::RunError::User(err) => AppError::RedisCommandError(err),
            bb8::RunError::TimedOut => {
                AppError::RedisPoolError("Redis connection timed out".into())
            }
        })
    }
}

#[async_trait]
impl FeedbackStore for DocumentStore {
    async fn insert(&self, new: NewFeedback) -> Result<Feedback, AppError> {
        let mut conn = self.conn().await?;

        let feedback = Feedback {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            recipe_id: new.recipe_id,
            rating: new.rating,
            comment: new.comment,
            created_at: new.created_at,
            updated_at: new.updated_at,
        };

        let json = serde_json::to_string(&feedback)
            .map_err(|e| AppError::Serialization(e.to_string()))?;

        let _: () = conn
            .set(RedisKey::feedback(feedback.id), json)
            .await
            .map_err(AppError::RedisCommandError)?;

        Ok(feedback)
    }

    async fn update(&self, feedback: &Feedback) -> Result<Feedback, AppError> {
        let mut conn = self.conn().await?;

        let key = RedisKey::feedback(feedback.id);
        let existing: Option<String> = conn
            .get(&key)
            .await
            .map_err(AppError::RedisCommandError)?;

        if existing.is_none() {
            return Err(AppError::NotFound(format!(
                "Feedback not found with id: {}",
                feedback.id
            )));
        }

        let json = serde_json::to_string(feedback)
            .map_err(|e| AppError::Serialization(e.to_string()))?;

        let _: () = conn
            .set(&key, json)
            .await
            .map_err(AppError::RedisCommandError)?;

        Ok(feedback.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Feedback>, AppError> {
        let mut conn = self.conn().await?;

        let json: Option<String> = conn
            .get(RedisKey::feedback(id))
            .await
            .map_err(AppError::RedisCommandError)?;

        match json {
            Some(json) => {
                let feedback = serde_json::from_str(&json)
                    .map_err(|e| AppError::Deserialization(e.to_string()))?;
                Ok(Some(feedback))
            }
            None => Ok(None),
        }
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let mut conn = self.conn().await?;

        let exists: bool = conn
            .exists(RedisKey::feedback(id))
            .await
            .map_err(AppError::RedisCommandError)?;

        Ok(exists)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), AppError> {
        let mut conn = self.conn().await?;

        let removed: i64 = conn
            .del(RedisKey::feedback(id))
            .await
            .map_err(AppError::RedisCommandError)?;

        if removed == 0 {
            return Err(AppError::NotFound(format!("Feedback not found with id: {id}")));
        }

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Feedback>, AppError> {
        let mut conn = self.conn().await?;

        let keys: Vec<String> = conn
            .keys(RedisKey::feedback_pattern())
            .await
            .map_err(AppError::RedisCommandError)?;

        let mut feedbacks = Vec::with_capacity(keys.len());

        for key in keys {
            let json: Option<String> = conn
                .get(&key)
                .await
                .map_err(AppError::RedisCommandError)?;

            // A key can expire between the scan and the fetch.
            if let Some(json) = json {
                let feedback: Feedback = serde_json::from_str(&json)
                    .map_err(|e| AppError::Deserialization(e.to_string()))?;
                feedbacks.push(feedback);
            }
        }

        Ok(feedbacks)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks = self.find_all().await?;
        feedbacks.retain(|f| f.user_id == user_id);
        sort_most_recent_first(&mut feedbacks);

        Ok(feedbacks)
    }

    async fn find_by_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, AppError> {
        let mut feedbacks = self.find_all().await?;
        feedbacks.retain(|f| f.recipe_id == recipe_id);
        sort_most_recent_first(&mut feedbacks);

        Ok(feedbacks)
    }

    async fn count_by_recipe(&self, recipe_id: &str) -> Result<u64, AppError> {
        let feedbacks = self.find_by_recipe(recipe_id).await?;

        Ok(feedbacks.len() as u64)
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
        let mut feedbacks = self.find_all().await?;
        sort_most_recent_first(&mut feedbacks);
        feedbacks.truncate(n as usize);

        Ok(feedbacks)
    }
}
