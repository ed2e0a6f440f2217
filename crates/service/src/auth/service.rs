use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument};

use super::domain::{AuthUser, LoginInput, NewUser, ProfileNotification, RegisterInput};
use super::errors::AuthError;
use super::hasher::CredentialHasher;
use super::notifier::ProfileNotifier;
use super::repository::UserRepository;
use super::token::TokenIssuer;

/// Orchestrates the credential store, password hasher, token issuer and
/// profile notifier. All four collaborators are injected at construction;
/// there is no retry logic, every failure is terminal for the call.
pub struct AuthService<R: UserRepository, N: ProfileNotifier> {
    repo: Arc<R>,
    notifier: Arc<N>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl<R: UserRepository, N: ProfileNotifier> AuthService<R, N> {
    pub fn new(repo: Arc<R>, notifier: Arc<N>, hasher: CredentialHasher, tokens: TokenIssuer) -> Self {
        Self { repo, notifier, hasher, tokens }
    }

    /// Register a new user with a hashed password and notify the profile
    /// service. The user row stays persisted even when the notification
    /// fails; the error tells the caller registration did not fully
    /// complete.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, hasher::CredentialHasher, token::TokenIssuer};
    /// use service::auth::repository::mock::MockUserRepository;
    /// use service::auth::notifier::mock::MockProfileNotifier;
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(
    ///     Arc::new(MockUserRepository::default()),
    ///     Arc::new(MockProfileNotifier::default()),
    ///     CredentialHasher::default(),
    ///     TokenIssuer::new("secret".into(), "iss".into(), "aud".into(), 30),
    /// );
    /// let input = RegisterInput { first_name: "Ana".into(), last_name: "Lee".into(), email: "ana@x.com".into(), password: "Secret123!".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "ana@x.com");
    /// assert!(user.verified);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        let email = models::user::normalize_email(&input.email);
        // Fast-path check; the store's unique constraint is the real arbiter
        if let Some(existing) = self.repo.find_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user = self
            .repo
            .add(NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                email,
                password_hash,
                // no confirmation flow; accounts start out verified
                verified: true,
                created_at: Utc::now(),
            })
            .await?;

        let notification = ProfileNotification::for_user(user.id, &user.first_name, &user.last_name);
        if let Err(e) = self.notifier.notify_profile_created(&notification).await {
            // No compensating rollback: the row stays, the caller is told
            // registration did not fully complete.
            error!(user_id = %user.id, error = %e, "profile notification failed after user was persisted");
            return Err(e);
        }

        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and issue a signed bearer token.
    ///
    /// Unknown email and wrong password return the same error so the
    /// endpoint cannot be used to enumerate accounts.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<String, AuthError> {
        let email = models::user::normalize_email(&input.email);
        let user = self
            .repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(&input.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.verified {
            return Err(AuthError::UnverifiedAccount);
        }

        self.tokens.issue(user.id, &user.email)
    }
}
