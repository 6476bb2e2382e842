//! User account domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user account in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)] // Never serialize password hash to API responses
    pub password_hash: String,
    pub nickname: String,
    pub image_url: Option<String>,
    /// Settled earnings credited to the user as a host.
    pub point: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile shown on `GET /mypage/profile`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub email: String,
    pub nickname: String,
    pub image_url: Option<String>,
    pub point: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            nickname: user.nickname,
            image_url: user.image_url,
            point: user.point,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: SafeEmail().fake(),
            password_hash: "secret_hash".to_string(),
            nickname: "host".to_string(),
            image_url: None,
            point: 15000,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let json = serde_json::to_string(&user()).unwrap();
        assert!(!json.contains("secret_hash"));
        assert!(!json.contains("passwordHash"));
    }

    #[test]
    fn test_profile_from_user() {
        let user = user();
        let id = user.id;
        let email = user.email.clone();
        let profile = ProfileResponse::from(user);
        assert_eq!(profile.user_id, id);
        assert_eq!(profile.email, email);
        assert_eq!(profile.point, 15000);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["nickname"], "host");
        assert!(json.get("imageUrl").is_some());
    }
}
