pub mod app;
pub mod config;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod habits;
pub mod models;
pub mod remote;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::CompletionStore;
