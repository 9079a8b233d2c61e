//! GameGreenEco Networking - HTTP adapter for the managed backend

pub mod api;
pub mod http;

pub use http::BackendClient;
