//! Raw HTTP access to the backend (auth, REST, storage)

mod client;

pub use client::BackendClient;
