use std::time::Duration;

use async_trait::async_trait;
use tracing::error;

use super::domain::ProfileNotification;
use super::errors::AuthError;

/// Outbound collaborator informed once a user has been persisted.
///
/// Single attempt, no retries: a failure surfaces to the caller as
/// `AuthError::Notification` even though the user row already exists.
#[async_trait]
pub trait ProfileNotifier: Send + Sync {
    async fn notify_profile_created(&self, notification: &ProfileNotification) -> Result<(), AuthError>;
}

/// Posts the notification to `{base_url}/api/profile` as JSON.
pub struct HttpProfileNotifier {
    client: reqwest::Client,
    base_url: String,
}

const CALL_TIMEOUT: Duration = Duration::from_secs(10);

fn profile_endpoint(base_url: &str) -> String {
    format!("{}/api/profile", base_url.trim_end_matches('/'))
}

impl HttpProfileNotifier {
    pub fn new(base_url: String) -> Self {
        Self { client: reqwest::Client::new(), base_url }
    }
}

#[async_trait]
impl ProfileNotifier for HttpProfileNotifier {
    async fn notify_profile_created(&self, notification: &ProfileNotification) -> Result<(), AuthError> {
        let url = profile_endpoint(&self.base_url);
        let resp = self
            .client
            .post(&url)
            .timeout(CALL_TIMEOUT)
            .json(notification)
            .send()
            .await
            .map_err(|e| {
                error!(user_id = %notification.user_id, error = %e, "profile service unreachable");
                AuthError::Notification(format!("transport error: {e}"))
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            // Keep the response body for diagnostics
            let body = resp.text().await.unwrap_or_default();
            error!(user_id = %notification.user_id, %status, body = %body, "failed to create user profile");
            return Err(AuthError::Notification(format!("profile service returned {status}: {body}")));
        }
        Ok(())
    }
}

/// In-memory notifier for tests: records successful calls, can be primed
/// to fail every call.
pub mod mock {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MockProfileNotifier {
        failure: Mutex<Option<String>>,
        calls: Mutex<Vec<ProfileNotification>>,
    }

    impl MockProfileNotifier {
        pub fn failing(message: &str) -> Self {
            Self { failure: Mutex::new(Some(message.to_string())), calls: Mutex::new(Vec::new()) }
        }

        pub fn calls(&self) -> Vec<ProfileNotification> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProfileNotifier for MockProfileNotifier {
        async fn notify_profile_created(&self, notification: &ProfileNotification) -> Result<(), AuthError> {
            if let Some(msg) = self.failure.lock().unwrap().clone() {
                return Err(AuthError::Notification(msg));
            }
            self.calls.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }
}
