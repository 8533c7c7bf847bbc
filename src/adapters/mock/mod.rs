pub mod activity_log;
pub mod borrower_store;
pub mod db;
pub mod item_store;
pub mod loan_store;

#[allow(unused_imports)]
pub use activity_log::ActivityLog;
#[allow(unused_imports)]
pub use borrower_store::BorrowerStore;
#[allow(unused_imports)]
pub use db::Db;
#[allow(unused_imports)]
pub use item_store::ItemStore;
#[allow(unused_imports)]
pub use loan_store::LoanStore;
