//! User repository for database operations

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewUser, User, UserRole};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user account; balances start at zero via column defaults
    pub async fn create(&self, new_user: &NewUser, role: UserRole) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, role,
                      suketuo_credits, lecture_credits, labor_credits,
                      created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, role,
                   suketuo_credits, lecture_credits, labor_credits,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}
