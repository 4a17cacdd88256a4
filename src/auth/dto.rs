use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

/// Request body for consuming a temp-password token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPasswordRequest {
    pub temp_token: String,
    pub password: String,
}

/// Request body for the forgot-password flow.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub is_email_verified: bool,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            user_name: user.username,
            email: user.email,
            is_email_verified: user.is_email_verified,
        }
    }
}

/// Plain message body used by logout and the reset flows.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            username: "jane".into(),
            email: "jane@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            is_email_verified: false,
            temp_password: Some("tok".into()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn public_user_uses_camel_case() {
        let public: PublicUser = sample_user().into();
        let json = serde_json::to_string(&public).unwrap();
        assert!(json.contains("\"firstName\":\"Jane\""));
        assert!(json.contains("\"userName\":\"jane\""));
        assert!(json.contains("\"isEmailVerified\":false"));
    }

    #[test]
    fn user_row_never_serializes_secrets() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("temp_password"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("tok"));
    }

    #[test]
    fn requests_accept_camel_case_bodies() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Jane","lastName":"Doe","email":"jane@example.com","password":"pw"}"#,
        )
        .unwrap();
        assert_eq!(req.first_name, "Jane");

        let req: LoginRequest =
            serde_json::from_str(r#"{"userName":"jane","password":"pw"}"#).unwrap();
        assert_eq!(req.user_name, "jane");

        let req: NewPasswordRequest =
            serde_json::from_str(r#"{"tempToken":"tok","password":"pw"}"#).unwrap();
        assert_eq!(req.temp_token, "tok");
    }
}
