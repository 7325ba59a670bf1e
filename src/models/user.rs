//! Users and authentication payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{timestamp, ParseValueError};

/// Role of a club member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "chasseur")]
    Hunter,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hunter => "chasseur",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "chasseur" | "hunter" => Ok(Role::Hunter),
            _ => Err(ParseValueError::new("role", s, "admin, chasseur")),
        }
    }
}

/// A club member as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// First name then last name, the way members are listed everywhere
    pub fn display_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Payload for `POST /auth/register` and `POST /hunters`
#[derive(Debug, Clone, Serialize)]
pub struct UserCreate {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Payload for `PUT /hunters/:id`, only the set fields are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.nom.is_none()
            && self.prenom.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Tokens and user returned by login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_format() {
        let json = r#"{
            "id": "0b7c2a9e-5d43-4a8e-9c1f-2f3d4e5a6b7c",
            "nom": "Dupont",
            "prenom": "Jean",
            "email": "jean@club.fr",
            "role": "chasseur",
            "created_at": "2024-09-01T10:00:00"
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.display_name(), "Jean Dupont");
        assert_eq!(user.role, Role::Hunter);
        assert!(!user.is_admin());
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = UserUpdate {
            email: Some("new@club.fr".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, serde_json::json!({ "email": "new@club.fr" }));
        assert!(UserUpdate::default().is_empty());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("hunter".parse::<Role>().unwrap(), Role::Hunter);
        assert!("guest".parse::<Role>().is_err());
    }
}
