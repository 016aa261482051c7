use std::fmt;

/// An OAuth token together with its secret. Used for both the request token of a
/// handshake and the long-lived access token.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

impl TokenPair {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// The on-disk form, `token:secret`.
    pub fn to_line(&self) -> String {
        format!("{}:{}", self.token, self.secret)
    }

    pub fn from_line(line: &str) -> Option<Self> {
        let (token, secret) = line.trim().split_once(':')?;
        if token.is_empty() {
            return None;
        }
        Some(Self::new(token, secret))
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
