//! PostgreSQL user repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::{info, warn};

use super::UserRepository;
use crate::models::{NewUser, Role, User};

/// User repository backed by the `users` table
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    let stored_roles: Vec<String> = row.get("roles");
    let roles = stored_roles
        .iter()
        .filter_map(|role| match role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                warn!("Ignoring stored role: {}", e);
                None
            }
        })
        .collect();

    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        roles,
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn exists_by_username(&self, username: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        info!("Finding user by username: {}", username);

        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, roles, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let roles: Vec<String> = new_user
            .roles
            .iter()
            .map(|role| role.as_str().to_string())
            .collect();

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, roles)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, roles, created_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&roles)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::query)?;

        Ok(user_from_row(&row))
    }
}
