//! Authenticated session.

use crate::error::{Error, Result};

/// Credentials for the inventory API, established outside this tool.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    access_token: String,
}

impl Session {
    /// Rejects an empty or blank token.
    pub fn new(user_id: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(Error::auth("no access token; set POE_ACCESS_TOKEN"));
        }
        Ok(Self {
            user_id: user_id.into(),
            access_token,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
