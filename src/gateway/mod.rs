pub mod handler;
pub mod http;
pub mod types;

pub use handler::Gateway;
pub use http::HttpGateway;
