use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use uuid::Uuid;

use crate::{
    db::FeedbackStore,
    errors::AppError,
    models::{Feedback, NewFeedback},
};

/// Relational backend over a `feedbacks` table. Ordering and aggregation are
/// pushed into SQL.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect to postgres: {e}")))?;

        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackStore for PostgresStore {
    async fn insert(&self, new: NewFeedback) -> Result<Feedback, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedbacks (id, user_id, recipe_id, rating, comment, created_at, updated_at)
			VALUES ($1, $2, $3, $4, $5, $6, $7)
			RETURNING id, user_id, recipe_id, rating, comment, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new.user_id)
        .bind(&new.recipe_id)
        .bind(new.rating)
        .bind(&new.comment)
        .bind(new.created_at)
        .bind(new.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert feedback: {e}")))?;

        Ok(feedback)
    }

    async fn update(&self, feedback: &Feedback) -> Result<Feedback, AppError> {
        let updated = sqlx::query_as::<_, Feedback>(
            "UPDATE feedbacks
			SET rating = $2, comment = $3, updated_at = $4
			WHERE id = $1
			RETURNING id, user_id, recipe_id, rating, comment, created_at, updated_at",
        )
        .bind(feedback.id)
        .bind(feedback.rating)
        .bind(&feedback.comment)
        .bind(feedback.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update feedback: {e}")))?;

        updated.ok_or_else(|| AppError::NotFound(format!("Feedback not found with id: {}", feedback.id)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Feedback>, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, recipe_id, rating, comment, created_at, updated_at
			FROM feedbacks
			WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch feedback: {e}")))?;

        Ok(feedback)
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM feedbacks WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to check feedback existence: {e}")))?;

        Ok(exists)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM feedbacks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete feedback: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Feedback not found with id: {id}")));
        }

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Feedback>, AppError> {
        let feedbacks = sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, recipe_id, rating, comment, created_at, updated_at
			FROM feedbacks",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch feedbacks: {e}")))?;

        Ok(feedbacks)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, AppError> {
        let feedbacks = sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, recipe_id, rating, comment, created_at, updated_at
			FROM feedbacks
			WHERE user_id = $1
			ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user feedbacks: {e}")))?;

        Ok(feedbacks)
    }

    async fn find_by_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, AppError> {
        let feedbacks = sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, recipe_id, rating, comment, created_at, updated_at
			FROM feedbacks
			WHERE recipe_id = $1
			ORDER BY created_at DESC",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch recipe feedbacks: {e}")))?;

        Ok(feedbacks)
    }

    async fn count_by_recipe(&self, recipe_id: &str) -> Result<u64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM feedbacks WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count recipe feedbacks: {e}")))?;

        Ok(count as u64)
    }

    async fn average_rating_by_recipe(&self, recipe_id: &str) -> Result<Option<f64>, AppError> {
        let average = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(rating)::DOUBLE PRECISION FROM feedbacks WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to average recipe ratings: {e}")))?;

        Ok(average)
    }

    async fn find_top_n_recent(&self, n: i64) -> Result<Vec<Feedback>, AppError> {
        let feedbacks = sqlx::query_as::<_, Feedback>(
            "SELECT id, user_id, recipe_id, rating, comment, created_at, updated_at
			FROM feedbacks
			ORDER BY created_at DESC
			LIMIT $1",
        )
        .bind(n)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch recent feedbacks: {e}")))?;

        Ok(feedbacks)
    }
}
