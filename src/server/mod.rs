pub mod config;
mod error;
mod http_layers;
pub mod metrics;
mod negotiate;
mod render;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub use negotiate::ResponseFormat;
pub use server::{make_app, run_server};
