//! Permission grant checks.
//!
//! Checked synchronously before any work begins. A missing grant rejects
//! the request with [`ChatError::PermissionDenied`].

use langchat_types::error::ChatError;
use langchat_types::principal::{Permission, Principal};

/// Require `permission` on `principal`.
pub fn require(principal: &Principal, permission: Permission) -> Result<(), ChatError> {
    if principal.has(permission) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %principal.user_id,
            permission = %permission,
            "permission denied"
        );
        Err(ChatError::PermissionDenied(permission.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(perms: &[&str]) -> Principal {
        Principal {
            user_id: "7".to_string(),
            username: "alice".to_string(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn require_passes_with_grant() {
        let p = principal(&["chat:completions"]);
        assert!(require(&p, Permission::ChatCompletions).is_ok());
    }

    #[test]
    fn require_denies_without_grant() {
        let p = principal(&["chat:completions"]);
        let err = require(&p, Permission::ChatMessagesClean).unwrap_err();
        match err {
            ChatError::PermissionDenied(name) => assert_eq!(name, "chat:messages:clean"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
