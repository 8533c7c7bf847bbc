use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_loan, get_borrower, get_loan, import_items, list_items, list_loans,
    recent_activity, reset_scans, return_bulk, return_item, scan_item,
};

/// Creates the API router with all inventory engine endpoints
///
/// Command endpoints (Write operations):
/// - POST /scans - Mark an item as scanned (stocktake)
/// - POST /scans/reset - Clear scan marks (one barcode or all)
/// - POST /items/import - Bulk upsert items (import collaborator)
/// - POST /loans - Create a loan (atomic multi-item reservation)
/// - POST /returns - Return one item
/// - POST /returns/bulk - Return many items (best-effort batch)
///
/// Query endpoints (Read operations):
/// - GET /items - List/search available items
/// - GET /loans - List open loans
/// - GET /loans/:invoice_no - Loan detail with its items
/// - GET /borrowers/:id - Borrower lookup
/// - GET /activity - Audit trail, newest first
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Command endpoints (Write operations)
        .route("/scans", post(scan_item))
        .route("/scans/reset", post(reset_scans))
        .route("/items/import", post(import_items))
        .route("/loans", post(create_loan))
        .route("/returns", post(return_item))
        .route("/returns/bulk", post(return_bulk))
        // Query endpoints (Read operations)
        .route("/items", get(list_items))
        .route("/loans", get(list_loans))
        .route("/loans/:invoice_no", get(get_loan))
        .route("/borrowers/:id", get(get_borrower))
        .route("/activity", get(recent_activity))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
