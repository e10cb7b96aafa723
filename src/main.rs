use compensation_engine::{configure_app, services::scheduler, AppConfig, AppState};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_env_filter("compensation_engine=debug,tower_http=debug")
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let scheduler_handle = scheduler::spawn(pool.clone(), config.clone());

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, config);
    let app = configure_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));
    info!("Starting server on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            scheduler_handle.shutdown();
        })
        .await
        .unwrap();
}
