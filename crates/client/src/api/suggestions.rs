//! Product suggestion endpoints.

use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, send_json};
use crate::suggestions::{Suggestion, SuggestionRecord};

impl ApiClient {
    /// `POST /suggestions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; 401/403 map to
    /// [`ApiError::Unauthorized`].
    #[instrument(skip(self, suggestion), fields(product_name = %suggestion.product_name))]
    pub async fn create_suggestion(
        &self,
        suggestion: &Suggestion,
    ) -> Result<SuggestionRecord, ApiError> {
        send_json(self.request(Method::POST, "suggestions").json(suggestion)).await
    }

    /// `GET /suggestions/user`: suggestions made by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_suggestions(&self) -> Result<Vec<SuggestionRecord>, ApiError> {
        send_json(self.request(Method::GET, "suggestions/user")).await
    }
}
