use async_trait::async_trait;

use super::domain::{AuthUser, NewUser};
use super::errors::AuthError;

/// Repository abstraction for the credential store.
///
/// `add` must treat the backing store as the final arbiter of email
/// uniqueness: a constraint violation maps to `AuthError::DuplicateEmail`,
/// never a raw storage failure.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn add(&self, new: NewUser) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use uuid::Uuid;

    use super::*;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: normalized email
    }

    impl MockUserRepository {
        pub fn user_count(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn add(&self, new: NewUser) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&new.email) {
                return Err(AuthError::DuplicateEmail);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email.clone(),
                password_hash: new.password_hash,
                verified: new.verified,
                created_at: new.created_at,
            };
            users.insert(new.email, user.clone());
            Ok(user)
        }
    }
}
