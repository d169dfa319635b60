//! Product suggestions submitted by signed-in users.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use cookie_shop_core::{SuggestionId, UserId};

use crate::api::{ApiClient, ApiError};
use crate::session;

/// A new product idea.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub author: String,
    pub product_name: String,
    pub description: String,
}

impl Suggestion {
    /// Whether every field has non-blank content.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [&self.author, &self.product_name, &self.description]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// A suggestion as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRecord {
    #[serde(default)]
    pub id: Option<SuggestionId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Result of [`submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionOutcome {
    /// Stored by the backend, with its id when the response carried one.
    Submitted(Option<SuggestionId>),
    /// The user must sign in first.
    SignInRequired,
    /// A field is blank; nothing was sent.
    Invalid,
}

/// Send a suggestion to the backend.
///
/// # Errors
///
/// Returns an error if the request fails for any reason other than missing
/// or rejected credentials.
#[instrument(skip(api, suggestion), fields(product_name = %suggestion.product_name))]
pub async fn submit(
    api: &ApiClient,
    suggestion: &Suggestion,
) -> Result<SuggestionOutcome, ApiError> {
    if !suggestion.is_valid() {
        return Ok(SuggestionOutcome::Invalid);
    }

    if !session::is_authenticated(api.store().as_ref()) {
        return Ok(SuggestionOutcome::SignInRequired);
    }

    match api.create_suggestion(suggestion).await {
        Ok(record) => {
            info!(suggestion_id = ?record.id, "Suggestion submitted");
            Ok(SuggestionOutcome::Submitted(record.id))
        }
        Err(e) if e.is_unauthorized() => {
            warn!(error = %e, "Backend rejected credentials for suggestion");
            Ok(SuggestionOutcome::SignInRequired)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStore;

    fn suggestion() -> Suggestion {
        Suggestion {
            author: "Ann".to_string(),
            product_name: "Lemon crinkle".to_string(),
            description: "Powdered sugar, lots of zest".to_string(),
        }
    }

    fn offline_client() -> ApiClient {
        // Nothing listens on the discard port; tests below never send.
        let config = ClientConfig::for_api_url("http://127.0.0.1:9/api").unwrap();
        ApiClient::new(&config, Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_blank_fields_are_invalid() {
        assert!(suggestion().is_valid());

        let blank_author = Suggestion {
            author: "   ".to_string(),
            ..suggestion()
        };
        assert!(!blank_author.is_valid());
        assert!(!Suggestion::default().is_valid());
    }

    #[test]
    fn test_wire_format() {
        let body = serde_json::to_value(suggestion()).unwrap();
        assert_eq!(body["productName"], "Lemon crinkle");

        let record: SuggestionRecord =
            serde_json::from_str(r#"{"id": 4, "userId": 2, "author": "Ann"}"#).unwrap();
        assert_eq!(record.id, Some(SuggestionId::new(4)));
        assert!(record.product_name.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_is_checked_before_session() {
        let outcome = submit(&offline_client(), &Suggestion::default()).await.unwrap();
        assert_eq!(outcome, SuggestionOutcome::Invalid);
    }

    #[tokio::test]
    async fn test_guest_must_sign_in() {
        let outcome = submit(&offline_client(), &suggestion()).await.unwrap();
        assert_eq!(outcome, SuggestionOutcome::SignInRequired);
    }
}
