pub mod activity_log;
pub mod borrower_store;
pub mod item_store;
pub mod loan_store;

#[allow(unused_imports)]
pub use activity_log::ActivityLog as PostgresActivityLog;
#[allow(unused_imports)]
pub use borrower_store::BorrowerStore as PostgresBorrowerStore;
#[allow(unused_imports)]
pub use item_store::ItemStore as PostgresItemStore;
#[allow(unused_imports)]
pub use loan_store::LoanStore as PostgresLoanStore;
