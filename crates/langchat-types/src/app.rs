//! Chat application ("app") configuration.
//!
//! An app bundles a system prompt and a preferred model. Loading app info
//! seeds conversation memory with the app's prompt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured chat application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// System prompt used to seed new conversations.
    pub prompt: Option<String>,
    /// Model used for this app's conversations unless the request overrides it.
    pub model_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl App {
    /// The system prompt, if one is configured and not blank.
    pub fn system_prompt(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(prompt: Option<&str>) -> App {
        App {
            id: "app-1".to_string(),
            name: "Helper".to_string(),
            description: None,
            prompt: prompt.map(str::to_string),
            model_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_system_prompt_present() {
        assert_eq!(app(Some("You are a helper")).system_prompt(), Some("You are a helper"));
    }

    #[test]
    fn test_system_prompt_blank_is_none() {
        assert!(app(Some("   ")).system_prompt().is_none());
        assert!(app(None).system_prompt().is_none());
    }
}
