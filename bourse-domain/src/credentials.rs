//! Exchange API Credentials
//!
//! Key/secret pair attached to private requests. The secret is zeroized
//! when dropped and never printed.

use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// API credentials for one exchange account.
#[derive(Clone)]
pub struct ApiCredentials {
    /// API Key (public identifier)
    pub api_key: String,
    /// API Secret
    pub api_secret: Zeroizing<String>,
}

impl ApiCredentials {
    /// Create new API credentials.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        }
    }

    /// Both key and secret are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

impl Zeroize for ApiCredentials {
    fn zeroize(&mut self) {
        self.api_key.zeroize();
        self.api_secret.zeroize();
    }
}

impl Drop for ApiCredentials {
    fn drop(&mut self) {
        self.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ApiCredentials::new("key-123", "super-secret");
        let printed = format!("{:?}", creds);

        assert!(printed.contains("key-123"));
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn test_api_credentials_zeroize() {
        let mut creds = ApiCredentials::new("key", "secret");
        assert!(creds.is_complete());

        creds.zeroize();

        assert!(creds.api_key.is_empty());
        assert!(creds.api_secret.is_empty());
        assert!(!creds.is_complete());
    }
}
