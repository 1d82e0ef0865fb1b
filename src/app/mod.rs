//! Application layer
//!
//! - `config`: configuration types
//! - `loader`: layered configuration loading
//! - `init`: building the engine and its collaborators

pub mod config;
pub mod init;
pub mod loader;

pub use config::AppConfig;
pub use init::{build, App};
pub use loader::load_config;
