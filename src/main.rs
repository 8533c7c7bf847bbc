use rusty_inventory_ddd::{
    adapters::postgres::{
        PostgresActivityLog, PostgresBorrowerStore, PostgresItemStore, PostgresLoanStore,
    },
    api::{handlers::AppState, router::create_router},
    application::ServiceDependencies,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_inventory_ddd=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection URL
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/inventory".into());

    tracing::info!("Database URL: {}", database_url);

    // Initialize database connection pool
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Apply migrations (items, borrowers, loans, activity log)
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters
    let item_store = Arc::new(PostgresItemStore::new(pool.clone()));
    let loan_store = Arc::new(PostgresLoanStore::new(pool.clone()));
    let borrower_store = Arc::new(PostgresBorrowerStore::new(pool.clone()));
    let activity_log = Arc::new(PostgresActivityLog::new(pool.clone()));

    // Create service dependencies
    let service_deps = ServiceDependencies {
        item_store,
        loan_store,
        borrower_store,
        activity_log,
    };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
