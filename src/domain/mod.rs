pub mod borrower;
pub mod commands;
pub mod errors;
pub mod item;
pub mod loan;
pub mod value_objects;

pub use borrower::Borrower;
pub use errors::*;
pub use item::{Item, NewItem};
pub use loan::{
    DEFAULT_LOAN_PERIOD_DAYS, Loan, LoanItem, due_date_for, loan_completed, validate_loan_items,
};
pub use value_objects::*;
