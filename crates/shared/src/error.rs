use serde::{Deserialize, Serialize};

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    /// Extracts `message` from a raw response body, if it carries one.
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ApiError>(body)
            .ok()
            .map(|err| err.message)
            .filter(|message| !message.trim().is_empty())
    }
}
