//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::user::{User, UserRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserEntity {
    pub fn into_model(self) -> Result<User, String> {
        let role: UserRole = self.role.parse()?;
        Ok(User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            role,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_model_parses_role() {
        let entity = UserEntity {
            id: Uuid::new_v4(),
            email: "admin@example.org".to_string(),
            display_name: "Admin".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: "admin".to_string(),
            active: true,
            created_at: Utc::now(),
        };
        assert_eq!(entity.into_model().unwrap().role, UserRole::Admin);
    }
}
