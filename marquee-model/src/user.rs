use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Access level of an account. Admin-gated operations check this flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    #[default]
    Member,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Storage keeps the role as text; anything but `admin` is a member.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("admin") => UserRole::Admin,
            _ => UserRole::Member,
        }
    }

    pub fn as_column(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Member => "member",
        }
    }
}

/// An account. The password field holds the argon2 hash, never plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub role: UserRole,
    pub poster_url: Option<String>,
}

/// Payload for creating or fully replacing a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub role: UserRole,
    pub poster_url: Option<String>,
}

/// Self-service profile update; credentials and role stay untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub poster_url: Option<String>,
}
