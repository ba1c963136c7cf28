//! User model, capabilities and JWT claims

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::AppError;

/// Capability a caller must hold for a protected action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Set a copy as returned and renew its loan
    CanMarkReturned,
    /// Create, edit and delete catalog records
    ManageCatalog,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
            Permission::ManageCatalog => "manage_catalog",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "can_mark_returned" => Ok(Permission::CanMarkReturned),
            "manage_catalog" => Ok(Permission::ManageCatalog),
            _ => Err(format!("Invalid permission: {}", s)),
        }
    }
}

/// Internal row structure for database queries
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    id: i32,
    username: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    is_active: bool,
    permissions: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let permissions = row
            .permissions
            .iter()
            .filter_map(|p| match p.parse() {
                Ok(permission) => Some(permission),
                Err(e) => {
                    tracing::warn!(user_id = row.id, "Ignoring stored permission: {}", e);
                    None
                }
            })
            .collect();

        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_active: row.is_active,
            permissions,
        }
    }
}

/// Library user (reader or librarian)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub permissions: Vec<Permission>,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Authorization check run at the top of protected handlers
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Vec<Permission>) -> UserClaims {
        let now = chrono::Utc::now().timestamp();
        UserClaims {
            sub: "librarian".into(),
            user_id: 7,
            permissions,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_require_permission() {
        let reader = claims(vec![]);
        assert!(matches!(
            reader.require(Permission::CanMarkReturned),
            Err(AppError::Authorization(_))
        ));

        let librarian = claims(vec![Permission::CanMarkReturned]);
        assert!(librarian.require(Permission::CanMarkReturned).is_ok());
        assert!(librarian.require(Permission::ManageCatalog).is_err());
    }

    #[test]
    fn test_token_round_trip() {
        let issued = claims(vec![Permission::ManageCatalog]);
        let token = issued.create_token("secret").unwrap();
        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.user_id, 7);
        assert_eq!(decoded.permissions, vec![Permission::ManageCatalog]);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_unknown_stored_permissions_are_dropped() {
        let row = UserRow {
            id: 1,
            username: "alice".into(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            email: None,
            is_active: true,
            permissions: vec!["can_mark_returned".into(), "fly".into()],
        };
        let user = User::from(row);
        assert_eq!(user.permissions, vec![Permission::CanMarkReturned]);
    }
}
