//! # DigiKey client
//!
//! Async client for the DigiKey Product Information v4 API using the OAuth2
//! client-credentials flow.
//!
//! A single token is shared by all calls. It is refreshed five minutes before
//! it expires, and once more whenever the API rejects it with a 401. Failed
//! calls come back as structured [`UpstreamError`] values rather than faults.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use digikey_client::{DigiKeyClient, DigiKeyResult, KeywordSearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> DigiKeyResult<()> {
//!     let client = DigiKeyClient::builder()
//!         .credentials("client-id", "client-secret")
//!         .connect()
//!         .await?;
//!
//!     match client.search().keyword(&KeywordSearchRequest::new("LM358", 5)).await {
//!         Ok(products) => println!("{}", products),
//!         Err(err) => eprintln!("{}", err.to_json()),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use api::{
    KeywordSearchRequest, PricingApi, ProductApi, SearchApi, SortOptions, SortOrder,
    SubstitutionsQuery,
};
pub use auth::{Clock, ManualClock, SystemClock, TokenCache};
pub use client::{DigiKeyClient, DigiKeyClientBuilder};
pub use config::{ClientConfig, Credentials, Environment, Locale};
pub use error::{DigiKeyError, DigiKeyResult, ErrorKind, RelayResult, UpstreamError};
pub use transport::HttpTransport;
