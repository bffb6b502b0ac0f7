//! Contains data structures for requests and responses exchanged with the
//! inference server.

pub mod generate;
mod http;
mod shared;

pub use http::*;
pub use shared::*;
