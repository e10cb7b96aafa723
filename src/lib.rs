pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use routes::configure_app;
pub use state::AppState;
