//! Backend operations built on the raw HTTP client
//!
//! `store` implements the `EcoStore` port; `session` adds helpers that
//! resolve the signed-in user first.

mod session;
mod store;

pub use session::*;
