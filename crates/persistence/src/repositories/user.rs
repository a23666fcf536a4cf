//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::UserEntity;

const USER_COLUMNS: &str = "id, email, display_name, password_hash, role, active, created_at";

/// Input for creating a user row.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new active user. Duplicate emails fail with 23505.
    pub async fn create(&self, input: CreateUserInput) -> Result<UserEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, UserEntity>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(&self.pool)
            .await
    }

    /// Finds a user by email (login path).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserEntity>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Lists users, optionally filtered by role, ordered by display name.
    pub async fn list(&self, role: Option<&str>) -> Result<Vec<UserEntity>, sqlx::Error> {
        match role {
            Some(role) => {
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY display_name ASC"
                );
                sqlx::query_as::<_, UserEntity>(&sql)
                    .bind(role)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY display_name ASC");
                sqlx::query_as::<_, UserEntity>(&sql)
                    .fetch_all(&self.pool)
                    .await
            }
        }
    }
}
