//! Transactions repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::TransactionsStore;
use crate::{
    error::{AppError, AppResult},
    lending::{CreditFloor, Transition},
    models::{Book, BookStatus, Transaction, TransactionStatus},
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionsStore for TransactionsRepository {
    async fn get_by_id(&self, id: i32) -> AppResult<Transaction> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE borrower_id = $1 OR owner_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn open_request(&self, book: &Book, borrower_id: i32) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        // Conditional flip so two concurrent requests cannot both win the book
        let flipped = sqlx::query("UPDATE books SET status = $1 WHERE id = $2 AND status = $3")
            .bind(BookStatus::PendingApproval)
            .bind(book.id)
            .bind(BookStatus::Available)
            .execute(&mut *tx)
            .await?;

        if flipped.rows_affected() == 0 {
            return Err(AppError::StateConflict("Unavailable".to_string()));
        }

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (book_id, borrower_id, owner_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(book.id)
        .bind(borrower_id)
        .bind(book.owner_id)
        .bind(TransactionStatus::Requested)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    async fn apply_transition(&self, id: i32, transition: &Transition) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let transaction = sqlx::query_as::<_, Transaction>(
            "UPDATE transactions SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(transition.transaction_status)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

        if let Some(book_status) = transition.book_status {
            sqlx::query("UPDATE books SET status = $1 WHERE id = $2")
                .bind(book_status)
                .bind(transaction.book_id)
                .execute(&mut *tx)
                .await?;
        }

        if let Some(debit) = transition.debit {
            let enforce_floor = debit.floor == CreditFloor::Enforced;
            let debited = sqlx::query(
                "UPDATE users SET credits = credits - $1 WHERE id = $2 AND (NOT $3 OR credits >= $1)",
            )
            .bind(debit.amount)
            .bind(debit.user_id)
            .bind(enforce_floor)
            .execute(&mut *tx)
            .await?;

            if debited.rows_affected() == 0 {
                return Err(AppError::StateConflict("Borrower lost credits".to_string()));
            }
        }

        tx.commit().await?;
        Ok(transaction)
    }
}
