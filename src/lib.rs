pub mod models {
    pub mod febos;
}

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod endpoints;
pub mod error;
pub mod schema;
pub mod transport;
pub mod services {
    pub mod discovery;
    pub mod shell;
}

pub use auth::Credentials;
pub use client::FebosClient;
pub use config::ClientConfig;
pub use error::{FebosError, Result};
