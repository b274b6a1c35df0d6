//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BooksStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookQuery, BookStatus, NewBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BooksStore for BooksRepository {
    async fn create(&self, owner_id: i32, book: &NewBook, reward: i32) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, description, cover_image, condition, category, status, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(&book.cover_image)
        .bind(&book.condition)
        .bind(&book.category)
        .bind(BookStatus::Available)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let rewarded = sqlx::query("UPDATE users SET credits = credits + $1 WHERE id = $2")
            .bind(reward)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        if rewarded.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", owner_id)));
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn search_available(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE status = $1
              AND ($2::text IS NULL OR strpos(title, $2) > 0)
              AND ($3::text IS NULL OR category = $3)
            ORDER BY id
            "#,
        )
        .bind(BookStatus::Available)
        .bind(query.search_text())
        .bind(query.category_filter())
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE owner_id = $1 ORDER BY id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}
