mod errors;
mod return_service;

pub use errors::{Result, ReturnApplicationError};
pub use return_service::{BulkReturnSummary, return_batch, return_item};
