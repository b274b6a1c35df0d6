//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::UsersStore;
use crate::{
    error::{AppError, AppResult},
    models::{NewUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsersStore for UsersRepository {
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password, full_name, unit_no, whatsapp_no, credits)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(&user.full_name)
        .bind(&user.unit_no)
        .bind(&user.whatsapp_no)
        .bind(user.credits)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            // Lost a race with another signup for the same email
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::Validation("Email taken".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
