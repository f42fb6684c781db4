use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use std::sync::Arc;

use crate::{
    clients::{PersistenceClient, RecommendationClient},
    db::FeedbackStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub recommendation: RecommendationClient,
    /// Present only when reference checks are enabled for this deployment.
    pub reference_checker: Option<PersistenceClient>,
}

pub type RedisClient = Pool<RedisConnectionManager>;
