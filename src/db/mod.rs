pub mod document;
pub mod postgres;
pub mod remote;

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    clients::PersistenceClient,
    config::{Config, StorageBackend},
    errors::AppError,
    models::{Feedback, NewFeedback},
};

/// Storage abstraction over the feedback records. Implemented by the
/// relational, document and remote backends; the service layer only ever
/// sees this trait.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Persists a new feedback and assigns its id.
    async fn insert(&self, new: NewFeedback) -> Result<Feedback, AppError>;

    /// Overwrites an existing feedback. The caller has already resolved the
    /// record, so a missing id is surfaced as `NotFound`.
    async fn update(&self, feedback: &Feedback) -> Result<Feedback, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Feedback>, AppError>;

    async fn exists_by_id(&self, id: Uuid) -> Result<bool, AppError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), AppError>;

    /// All records, store-defined ordering.
    async fn find_all(&self) -> Result<Vec<Feedback>, AppError>;

    /// Records for one user, most recent first.
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, AppError>;

    /// Records for one recipe, most recent first.
    async fn find_by_recipe(&self, recipe_id: &str) -> Result<Vec<Feedback>, AppError>;

    async fn count_by_recipe(&self, recipe_id: &str) -> Result<u64, AppError>;

    /// Unrounded arithmetic mean of the ratings for one recipe, `None` when
    /// the recipe has no feedbacks. Rounding happens in the factory so that
    /// every backend agrees to two decimals.
    async fn average_rating_by_recipe(&self, recipe_id: &str) -> Result<Option<f64>, AppError>;

    /// The `n` most recently created records, most recent first.
    async fn find_top_n_recent(&self, n: i64) -> Result<Vec<Feedback>, AppError>;
}

pub async fn connect_store(config: &Config) -> Result<Arc<dyn FeedbackStore>, AppError> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::EnvError("DATABASE_URL must be set".into()))?;
            let store = postgres::PostgresStore::connect(url).await?;
            tracing::info!("Connected to postgres feedback store");
            Ok(Arc::new(store))
        }
        StorageBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| AppError::EnvError("REDIS_URL must be set".into()))?;
            let store = document::DocumentStore::connect(url).await?;
            tracing::info!("Connected to redis feedback store");
            Ok(Arc::new(store))
        }
        StorageBackend::Remote => {
            let url = config
                .persistence_service_url
                .clone()
                .ok_or_else(|| AppError::EnvError("PERSISTENCE_SERVICE_URL must be set".into()))?;
            let store = remote::RemoteStore::new(PersistenceClient::new(url));
            tracing::info!("Using remote persistence service as feedback store");
            Ok(Arc::new(store))
        }
    }
}

/// Sorts most recent first by creation time. Shared by the backends that
/// order in memory rather than in the store engine.
pub(crate) fn sort_most_recent_first(feedbacks: &mut [Feedback]) {
    feedbacks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
