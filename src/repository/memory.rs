//! In-memory store used for tests and database-less demos.
//!
//! One mutex guards all three tables, so each trait method is atomic in the
//! same way a Postgres transaction is.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;

use super::{BooksStore, TransactionsStore, UsersStore};
use crate::{
    error::{AppError, AppResult},
    lending::{ledger, Transition},
    models::{Book, BookQuery, BookStatus, NewBook, NewUser, Transaction, TransactionStatus, User},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    books: BTreeMap<i32, Book>,
    transactions: BTreeMap<i32, Transaction>,
    last_user_id: i32,
    last_book_id: i32,
    last_transaction_id: i32,
}

impl Tables {
    fn user_mut(&mut self, id: i32) -> AppResult<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("In-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UsersStore for MemoryStore {
    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let mut tables = self.lock()?;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Validation("Email taken".to_string()));
        }

        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            email: user.email.clone(),
            hashed_password: user.hashed_password.clone(),
            full_name: user.full_name.clone(),
            unit_no: user.unit_no.clone(),
            whatsapp_no: user.whatsapp_no.clone(),
            credits: user.credits,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let tables = self.lock()?;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.lock()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BooksStore for MemoryStore {
    async fn create(&self, owner_id: i32, book: &NewBook, reward: i32) -> AppResult<Book> {
        let mut tables = self.lock()?;

        let owner = tables.user_mut(owner_id)?;
        owner.credits = ledger::credit(owner.credits, reward);

        tables.last_book_id += 1;
        let created = Book {
            id: tables.last_book_id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            description: book.description.clone(),
            cover_image: book.cover_image.clone(),
            condition: book.condition.clone(),
            category: book.category.clone(),
            status: BookStatus::Available,
            owner_id,
            created_at: Utc::now(),
        };
        tables.books.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let tables = self.lock()?;
        tables
            .books
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn search_available(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let tables = self.lock()?;
        Ok(tables
            .books
            .values()
            .filter(|b| query.matches(b))
            .cloned()
            .collect())
    }

    async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let tables = self.lock()?;
        Ok(tables
            .books
            .values()
            .rev()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionsStore for MemoryStore {
    async fn get_by_id(&self, id: i32) -> AppResult<Transaction> {
        let tables = self.lock()?;
        tables
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Transaction>> {
        let tables = self.lock()?;
        Ok(tables
            .transactions
            .values()
            .filter(|t| t.borrower_id == user_id || t.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn open_request(&self, book: &Book, borrower_id: i32) -> AppResult<Transaction> {
        let mut tables = self.lock()?;

        let stored = tables
            .books
            .get_mut(&book.id)
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book.id)))?;
        if stored.status != BookStatus::Available {
            return Err(AppError::StateConflict("Unavailable".to_string()));
        }
        stored.status = BookStatus::PendingApproval;

        tables.last_transaction_id += 1;
        let transaction = Transaction {
            id: tables.last_transaction_id,
            book_id: book.id,
            borrower_id,
            owner_id: book.owner_id,
            status: TransactionStatus::Requested,
            created_at: Utc::now(),
        };
        tables.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn apply_transition(&self, id: i32, transition: &Transition) -> AppResult<Transaction> {
        let mut tables = self.lock()?;

        let mut transaction = tables
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

        // Validate every write before touching any table
        let debited_balance = match transition.debit {
            Some(debit) => {
                let borrower = tables.user_mut(debit.user_id)?;
                Some(ledger::debit(borrower.credits, debit.amount, debit.floor)?)
            }
            None => None,
        };

        if let (Some(debit), Some(balance)) = (transition.debit, debited_balance) {
            tables.user_mut(debit.user_id)?.credits = balance;
        }

        if let Some(book_status) = transition.book_status {
            if let Some(book) = tables.books.get_mut(&transaction.book_id) {
                book.status = book_status;
            }
        }

        transaction.status = transition.transaction_status;
        tables.transactions.insert(id, transaction.clone());
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lending::{CreditDebit, CreditFloor};
    use crate::models::TransactionAction;

    fn new_user(email: &str, credits: i32) -> NewUser {
        NewUser {
            email: email.to_string(),
            hashed_password: "hash".to_string(),
            full_name: "Test".to_string(),
            unit_no: "1A".to_string(),
            whatsapp_no: "+100".to_string(),
            credits,
        }
    }

    fn new_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: "Author".to_string(),
            isbn: None,
            description: None,
            cover_image: None,
            condition: "Good".to_string(),
            category: "Fiction".to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::default();
        UsersStore::create(&store, &new_user("a@example.org", 3)).await.unwrap();
        let result = UsersStore::create(&store, &new_user("a@example.org", 3)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_by_owner_newest_first() {
        let store = MemoryStore::default();
        let owner = UsersStore::create(&store, &new_user("a@example.org", 3)).await.unwrap();
        for title in ["First", "Second", "Third"] {
            BooksStore::create(&store, owner.id, &new_book(title), 1).await.unwrap();
        }

        let titles: Vec<String> = store
            .list_by_owner(owner.id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, ["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_second_open_request_loses() {
        let store = MemoryStore::default();
        let owner = UsersStore::create(&store, &new_user("a@example.org", 3)).await.unwrap();
        let book = BooksStore::create(&store, owner.id, &new_book("Dune"), 1).await.unwrap();

        // Both callers saw the book as Available before either wrote
        store.open_request(&book, 2).await.unwrap();
        let result = store.open_request(&book, 3).await;
        assert!(matches!(result, Err(AppError::StateConflict(_))));
    }

    #[tokio::test]
    async fn test_enforced_floor_rolls_back_transition() {
        let store = MemoryStore::default();
        let owner = UsersStore::create(&store, &new_user("a@example.org", 3)).await.unwrap();
        let borrower = UsersStore::create(&store, &new_user("b@example.org", 0)).await.unwrap();
        let book = BooksStore::create(&store, owner.id, &new_book("Dune"), 1).await.unwrap();
        let transaction = store.open_request(&book, borrower.id).await.unwrap();

        let transition = Transition {
            action: TransactionAction::Approve,
            transaction_status: TransactionStatus::Approved,
            book_status: None,
            debit: Some(CreditDebit {
                user_id: borrower.id,
                amount: 1,
                floor: CreditFloor::Enforced,
            }),
        };
        let result = store.apply_transition(transaction.id, &transition).await;
        assert!(matches!(result, Err(AppError::StateConflict(_))));

        let unchanged = TransactionsStore::get_by_id(&store, transaction.id).await.unwrap();
        assert_eq!(unchanged.status, TransactionStatus::Requested);
        assert_eq!(UsersStore::get_by_id(&store, borrower.id).await.unwrap().credits, 0);
    }
}
