//! Credit ledger rules

use crate::error::{AppError, AppResult};

/// Balance given to every new user
pub const STARTING_CREDITS: i32 = 3;

/// Credits earned for listing a book
pub const LISTING_REWARD: i32 = 1;

/// Credits spent by the borrower when a request is approved
pub const BORROW_COST: i32 = 1;

/// Whether debits may push a balance below zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreditFloor {
    #[default]
    Unchecked,
    Enforced,
}

/// A user may request (and be approved for) a borrow with at least one credit
pub fn can_borrow(credits: i32) -> bool {
    credits >= BORROW_COST
}

/// Balance after a reward
pub fn credit(balance: i32, amount: i32) -> i32 {
    balance.saturating_add(amount)
}

/// Balance after a debit, rejected when the floor is enforced and would be crossed
pub fn debit(balance: i32, amount: i32, floor: CreditFloor) -> AppResult<i32> {
    let remaining = balance.saturating_sub(amount);
    if floor == CreditFloor::Enforced && remaining < 0 {
        return Err(AppError::StateConflict(format!(
            "Insufficient credits: balance {} cannot cover {}",
            balance, amount
        )));
    }
    Ok(remaining)
}
