pub mod codec;
pub mod commands;
pub mod config;
pub mod database;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod keyboard;
pub mod schema;
pub mod session;
pub mod state;
pub mod transport;
pub mod update;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
