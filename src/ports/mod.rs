pub mod activity_log;
pub mod borrower_store;
pub mod item_store;
pub mod loan_store;

#[allow(unused_imports)]
pub use activity_log::{ActivityAction, ActivityEntry, ActivityLog, NewActivityEntry};
#[allow(unused_imports)]
pub use borrower_store::BorrowerStore;
#[allow(unused_imports)]
pub use item_store::{ItemStore, StatusPredicate};
#[allow(unused_imports)]
pub use loan_store::{LoanStore, NewLoan, ReturnedItem};
