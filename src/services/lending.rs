//! Borrow request service

use crate::{
    error::AppResult,
    lending::{self, LendingPolicy},
    models::{Transaction, TransactionAction, TransactionDetails, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    policy: LendingPolicy,
}

impl LendingService {
    pub fn new(repository: Repository, policy: LendingPolicy) -> Self {
        Self { repository, policy }
    }

    /// Ask to borrow a book
    pub async fn request(&self, book_id: i32, borrower: &User) -> AppResult<Transaction> {
        let book = self.repository.books.get_by_id(book_id).await?;
        lending::check_request(&book, borrower)?;

        let transaction = self
            .repository
            .transactions
            .open_request(&book, borrower.id)
            .await?;

        tracing::info!(
            "Transaction {} opened: user {} requests book {} from user {}",
            transaction.id,
            borrower.id,
            book.id,
            book.owner_id
        );
        Ok(transaction)
    }

    /// Apply an owner action (approve, handover, return) to a transaction
    pub async fn act(
        &self,
        transaction_id: i32,
        action: TransactionAction,
        actor: &User,
    ) -> AppResult<Transaction> {
        let transaction = self.repository.transactions.get_by_id(transaction_id).await?;
        let borrower = self
            .repository
            .users
            .get_by_id(transaction.borrower_id)
            .await?;

        let transition =
            lending::plan_transition(&transaction, actor.id, action, &borrower, self.policy)?;

        let updated = self
            .repository
            .transactions
            .apply_transition(transaction_id, &transition)
            .await?;

        tracing::info!(
            "Transaction {}: {} by user {} ({} -> {})",
            transaction_id,
            action,
            actor.id,
            transaction.status,
            updated.status
        );
        Ok(updated)
    }

    /// Transactions the user takes part in, with book and both parties
    pub async fn my_requests(&self, user_id: i32) -> AppResult<Vec<TransactionDetails>> {
        let transactions = self.repository.transactions.list_for_user(user_id).await?;

        let mut details = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            let book = self.repository.books.get_by_id(transaction.book_id).await?;
            let borrower = self
                .repository
                .users
                .get_by_id(transaction.borrower_id)
                .await?;
            let owner = self.repository.users.get_by_id(transaction.owner_id).await?;
            details.push(TransactionDetails::new(transaction, book, borrower, owner));
        }

        Ok(details)
    }
}
