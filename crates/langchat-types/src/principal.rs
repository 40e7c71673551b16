//! Authenticated caller identity and permission grants.

use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;
use std::fmt;

/// A permission grant checked before an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    /// Stream a chat completion.
    ChatCompletions,
    /// Clear a conversation's persisted messages.
    ChatMessagesClean,
}

impl Permission {
    /// Wire name of the grant, e.g. `chat:completions`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ChatCompletions => "chat:completions",
            Permission::ChatMessagesClean => "chat:messages:clean",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller behind a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    /// Granted permission names. `*` grants everything.
    pub permissions: BTreeSet<String>,
}

impl Principal {
    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains("*") || self.permissions.contains(permission.as_str())
    }
}
