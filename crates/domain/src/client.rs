use crate::appointment::normalize_token;
use crate::shared::entity::Entity;
use serde::{Deserialize, Serialize};

/// A `Client` of a tenant together with the push tokens of the devices the
/// client has registered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub fcm_tokens: Vec<String>,
}

impl Client {
    pub fn new(id: impl Into<String>, fcm_tokens: Vec<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            fcm_tokens,
        }
    }

    /// Registered tokens with blanks removed
    pub fn tokens(&self) -> Vec<String> {
        self.fcm_tokens
            .iter()
            .filter_map(|t| normalize_token(t))
            .map(String::from)
            .collect()
    }
}

impl Entity for Client {
    fn id(&self) -> &str {
        &self.id
    }
}
