//! Transport layer for the DigiKey client.

pub mod http;

pub use http::{HttpTransport, MAX_ATTEMPTS};
