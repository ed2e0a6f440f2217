use thiserror::Error;

/// Business errors for auth workflows.
///
/// `InvalidCredentials` deliberately carries the same message whether the
/// email is unknown or the password is wrong, so callers cannot probe for
/// account existence.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already exists")]
    DuplicateEmail,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email not verified")]
    UnverifiedAccount,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("notification error: {0}")]
    Notification(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("hashing error: {0}")]
    Hash(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::DuplicateEmail => 1001,
            AuthError::InvalidCredentials => 1002,
            AuthError::UnverifiedAccount => 1003,
            AuthError::InvalidToken(_) => 1004,
            AuthError::Hash(_) => 1101,
            AuthError::Configuration(_) => 1102,
            AuthError::Storage(_) => 1200,
            AuthError::Notification(_) => 1300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_message_does_not_leak_cause() {
        // unknown email and wrong password must be indistinguishable
        assert_eq!(AuthError::InvalidCredentials.to_string(), "invalid email or password");
    }
}
