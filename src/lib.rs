pub mod analytics;
pub mod config_manager;
pub mod handlers;
pub mod monitor;
pub mod routes;
pub mod state;
pub mod translate;
