//! Applies pending schema migrations and exits.
//!
//! Run once per deploy, before starting `tasktrack-api`:
//!
//! ```text
//! DATABASE_URL=postgres://... tasktrack-migrate
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasktrack_db=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = tasktrack_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    tasktrack_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");
}
