//! Borrow transaction model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{book::Book, user::User};

/// Transaction lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TransactionStatus {
    Requested,
    Approved,
    Completed,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Requested => "Requested",
            TransactionStatus::Approved => "Approved",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Returned => "Returned",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requested" => Ok(TransactionStatus::Requested),
            "Approved" => Ok(TransactionStatus::Approved),
            "Completed" => Ok(TransactionStatus::Completed),
            "Returned" => Ok(TransactionStatus::Returned),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

super::impl_text_status!(TransactionStatus);

/// Owner-side action on an existing transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionAction {
    Approve,
    Handover,
    Return,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionAction::Approve => "approve",
            TransactionAction::Handover => "handover",
            TransactionAction::Return => "return",
        }
    }
}

impl std::fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(TransactionAction::Approve),
            "handover" => Ok(TransactionAction::Handover),
            "return" => Ok(TransactionAction::Return),
            _ => Err(format!("Unknown transaction action: {}", s)),
        }
    }
}

/// Transaction record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i32,
    pub book_id: i32,
    pub borrower_id: i32,
    /// Book owner at request time
    pub owner_id: i32,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Transaction with the book and both parties, for dashboards
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionDetails {
    pub id: i32,
    pub book_id: i32,
    pub borrower_id: i32,
    pub owner_id: i32,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub book: Book,
    pub borrower: User,
    pub owner: User,
}

impl TransactionDetails {
    pub fn new(transaction: Transaction, book: Book, borrower: User, owner: User) -> Self {
        Self {
            id: transaction.id,
            book_id: transaction.book_id,
            borrower_id: transaction.borrower_id,
            owner_id: transaction.owner_id,
            status: transaction.status,
            created_at: transaction.created_at,
            book,
            borrower,
            owner,
        }
    }
}

/// Borrow request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub book_id: i32,
}
