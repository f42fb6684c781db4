use crate::{errors::AppError, models::Feedback};

/// HTTP client for the downstream recommendation service. One attempt per
/// call, no retries; a failed send is retried by the operator.
#[derive(Clone)]
pub struct RecommendationClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecommendationClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn submit_batch(&self, feedbacks: &[Feedback]) -> Result<(), AppError> {
        let url = format!("{}/api/recommendations/update-model", self.base_url);

        let res = self
            .http
            .post(&url)
            .json(feedbacks)
            .send()
            .await
            .map_err(|e| AppError::DownstreamUnavailable(format!("{url}: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::DownstreamUnavailable(format!(
                "{url} responded with status {}",
                res.status()
            )));
        }

        Ok(())
    }
}
