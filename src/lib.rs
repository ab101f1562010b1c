pub mod completion;
pub mod config;
pub mod error;
pub mod gateway;

pub use config::Config;
pub use error::{GatewayError, Result};
