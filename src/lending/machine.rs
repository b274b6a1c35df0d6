//! Transaction state machine

use super::ledger::{self, CreditFloor, BORROW_COST};
use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{Book, BookStatus, Transaction, TransactionAction, TransactionStatus, User},
};

/// Deployment-tunable lending rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LendingPolicy {
    /// Require Requested -> Approved -> Completed -> Returned
    pub strict_transitions: bool,
    pub credit_floor: CreditFloor,
}

impl From<&LendingConfig> for LendingPolicy {
    fn from(config: &LendingConfig) -> Self {
        Self {
            strict_transitions: config.strict_transitions,
            credit_floor: if config.enforce_credit_floor {
                CreditFloor::Enforced
            } else {
                CreditFloor::Unchecked
            },
        }
    }
}

/// Credits to take from a user as part of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditDebit {
    pub user_id: i32,
    pub amount: i32,
    pub floor: CreditFloor,
}

/// Changes an owner action makes, applied by the repository in one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: TransactionAction,
    pub transaction_status: TransactionStatus,
    pub book_status: Option<BookStatus>,
    pub debit: Option<CreditDebit>,
}

/// Guards for opening a borrow request, checked in order
pub fn check_request(book: &Book, borrower: &User) -> AppResult<()> {
    if book.status != BookStatus::Available {
        return Err(AppError::StateConflict("Unavailable".to_string()));
    }
    if book.owner_id == borrower.id {
        return Err(AppError::StateConflict("Cannot request own book".to_string()));
    }
    if !ledger::can_borrow(borrower.credits) {
        return Err(AppError::StateConflict("Insufficient credits".to_string()));
    }
    Ok(())
}

/// Status a transaction must be in for the action under strict ordering
fn required_status(action: TransactionAction) -> TransactionStatus {
    match action {
        TransactionAction::Approve => TransactionStatus::Requested,
        TransactionAction::Handover => TransactionStatus::Approved,
        TransactionAction::Return => TransactionStatus::Completed,
    }
}

/// Work out what an owner action changes, or why it is refused
pub fn plan_transition(
    transaction: &Transaction,
    actor_id: i32,
    action: TransactionAction,
    borrower: &User,
    policy: LendingPolicy,
) -> AppResult<Transition> {
    if transaction.owner_id != actor_id {
        return Err(AppError::Authorization("Unauthorized".to_string()));
    }

    if policy.strict_transitions {
        let required = required_status(action);
        if transaction.status != required {
            return Err(AppError::StateConflict(format!(
                "Cannot {} a transaction that is {} (expected {})",
                action, transaction.status, required
            )));
        }
    }

    let transition = match action {
        TransactionAction::Approve => {
            if !ledger::can_borrow(borrower.credits) {
                return Err(AppError::StateConflict("Borrower lost credits".to_string()));
            }
            ledger::debit(borrower.credits, BORROW_COST, policy.credit_floor)?;
            Transition {
                action,
                transaction_status: TransactionStatus::Approved,
                book_status: None,
                debit: Some(CreditDebit {
                    user_id: borrower.id,
                    amount: BORROW_COST,
                    floor: policy.credit_floor,
                }),
            }
        }
        TransactionAction::Handover => Transition {
            action,
            transaction_status: TransactionStatus::Completed,
            book_status: Some(BookStatus::Exchanged),
            debit: None,
        },
        TransactionAction::Return => Transition {
            action,
            transaction_status: TransactionStatus::Returned,
            book_status: Some(BookStatus::Available),
            debit: None,
        },
    };

    Ok(transition)
}
