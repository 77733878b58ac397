pub mod config;
pub mod models;
pub mod routes;
pub mod state;

pub use config::{Config, ConfigError};
pub use routes::create_router;
pub use state::AppState;
