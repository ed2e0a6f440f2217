use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Stored identity record (business view). `password_hash` never leaves the
/// service layer; HTTP responses project the fields they need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Outbound DTO for the profile service; exists only for the duration of
/// the call. Contact info and picture are placeholders the profile service
/// fills in later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileNotification {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub contact_info: String,
    pub profile_picture: String,
}

impl ProfileNotification {
    pub fn for_user(user_id: Uuid, first_name: &str, last_name: &str) -> Self {
        Self {
            user_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            contact_info: String::new(),
            profile_picture: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_notification_serializes_camel_case() {
        let n = ProfileNotification::for_user(Uuid::nil(), "Ana", "Lee");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["firstName"], "Ana");
        assert_eq!(json["lastName"], "Lee");
        assert_eq!(json["contactInfo"], "");
        assert_eq!(json["profilePicture"], "");
        assert!(json.get("userId").is_some());
    }

    #[test]
    fn register_input_accepts_camel_case_body() {
        let input: RegisterInput = serde_json::from_str(
            r#"{"firstName":"Ana","lastName":"Lee","email":"ana@x.com","password":"Secret123!"}"#,
        )
        .unwrap();
        assert_eq!(input.first_name, "Ana");
        assert_eq!(input.last_name, "Lee");
    }
}
