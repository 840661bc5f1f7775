//! OAuth2 client-credentials token lifecycle.

pub mod clock;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use token::{TokenCache, DEFAULT_EXPIRES_IN_SECS, MAX_EXPIRES_IN_SECS, REFRESH_MARGIN_SECS};
