use reqwest::StatusCode;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{Feedback, NewFeedback},
};

/// HTTP client for the sibling persistence service. Used as the remote
/// storage backend and for user/recipe existence checks at creation time.
#[derive(Clone)]
pub struct PersistenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl PersistenceClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_feedback(&self, new: &NewFeedback) -> Result<Feedback, AppError> {
        let url = format!("{}/api/persistence/feedbacks", self.base_url);

        let res = self
            .http
            .post(&url)
            .json(new)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("{url}: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::DownstreamUnavailable(format!(
                "{url} responded with status {}",
                res.status()
            )));
        }

        res.json::<Feedback>()
            .await
            .map_err(|e| AppError::Deserialization(format!("Invalid JSON response: {e}")))
    }

    pub async fn get_all_feedbacks(&self) -> Result<Vec<Feedback>, AppError> {
        let url = format!("{}/api/persistence/feedbacks", self.base_url);
        self.fetch_list(&url).await
    }

    pub async fn get_feedback_by_id(&self, id: Uuid) -> Result<Option<Feedback>, AppError> {
        let url = format!("{}/api/persistence/feedbacks/{id}", self.base_url);

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("{url}: {e}")))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !res.status().is_success() {
            return Err(AppError::DownstreamUnavailable(format!(
                "{url} responded with status {}",
                res.status()
            )));
        }

        let feedback = res
            .json::<Feedback>()
            .await
            .map_err(|e| AppError::Deserialization(format!("Invalid JSON response: {e}")))?;

        Ok(Some(feedback))
    }

    pub async fn get_feedbacks_by_user(&self, user_id: &str) -> Result<Vec<Feedback>, AppError> {
        let url = format!("{}/api/persistence/feedbacks/user/{user_id}", self.base_url);
        self.fetch_list(&url).await
    }

    pub async fn get_feedbacks_by_recipe(
        &self,
        recipe_id: &str,
    ) -> Result<Vec<Feedback>, AppError> {
        let url = format!(
            "{}/api/persistence/feedbacks/recipe/{recipe_id}",
            self.base_url
        );
        self.fetch_list(&url).await
    }

    pub async fn update_feedback(&self, feedback: &Feedback) -> Result<Feedback, AppError> {
        let url = format!(
            "{}/api/persistence/feedbacks/{}",
            self.base_url, feedback.id
        );

        let res = self
            .http
            .put(&url)
            .json(feedback)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("{url}: {e}")))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "Feedback not found with id: {}",
                feedback.id
            )));
        }

        if !res.status().is_success() {
            return Err(AppError::DownstreamUnavailable(format!(
                "{url} responded with status {}",
                res.status()
            )));
        }

        res.json::<Feedback>()
            .await
            .map_err(|e| AppError::Deserialization(format!("Invalid JSON response: {e}")))
    }

    pub async fn delete_feedback(&self, id: Uuid) -> Result<(), AppError> {
        let url = format!("{}/api/persistence/feedbacks/{id}", self.base_url);

        let res = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("{url}: {e}")))?;

        if res.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Feedback not found with id: {id}")));
        }

        if !res.status().is_success() {
            return Err(AppError::DownstreamUnavailable(format!(
                "{url} responded with status {}",
                res.status()
            )));
        }

        Ok(())
    }

    pub async fn user_exists(&self, user_id: &str) -> Result<bool, AppError> {
        let url = format!("{}/api/persistence/users/{user_id}", self.base_url);
        self.check_exists(&url).await
    }

    pub async fn recipe_exists(&self, recipe_id: &str) -> Result<bool, AppError> {
        let url = format!("{}/api/persistence/recipes/{recipe_id}", self.base_url);
        self.check_exists(&url).await
    }

    async fn fetch_list(&self, url: &str) -> Result<Vec<Feedback>, AppError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("{url}: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::DownstreamUnavailable(format!(
                "{url} responded with status {}",
                res.status()
            )));
        }

        res.json::<Vec<Feedback>>()
            .await
            .map_err(|e| AppError::Deserialization(format!("Invalid JSON response: {e}")))
    }

    // An unreachable persistence service counts as "does not exist".
    async fn check_exists(&self, url: &str) -> Result<bool, AppError> {
        match self.http.get(url).send().await {
            Ok(res) if res.status().is_success() => Ok(true),
            Ok(res) if res.status() == StatusCode::NOT_FOUND => Ok(false),
            Ok(res) => {
                tracing::warn!("Existence check {} returned status {}", url, res.status());
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Existence check {} failed: {}", url, e);
                Ok(false)
            }
        }
    }
}
