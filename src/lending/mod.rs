//! Lending rules: the credit ledger and the transaction state machine.
//!
//! Everything here is pure. Services load records through the repository,
//! ask this module what a request or action is allowed to change, then hand
//! the resulting plan back to the repository to apply atomically.

pub mod ledger;
pub mod machine;

pub use ledger::{CreditFloor, BORROW_COST, LISTING_REWARD, STARTING_CREDITS};
pub use machine::{check_request, plan_transition, CreditDebit, LendingPolicy, Transition};
