//! DigiKey Product Information v4 endpoints.

mod pricing;
mod product;
mod search;

pub use pricing::PricingApi;
pub use product::{ProductApi, SubstitutionsQuery};
pub use search::{KeywordSearchRequest, SearchApi, SortOptions, SortOrder};

use crate::client::DigiKeyClient;
use crate::error::UpstreamError;
use url::Url;

/// Build `<products base>/<segments...>`, percent-encoding each segment.
pub(crate) fn endpoint(client: &DigiKeyClient, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = client
        .products_url()
        .map_err(|e| UpstreamError::invalid_request(None, e.to_string()))?;

    url.path_segments_mut()
        .map_err(|_| UpstreamError::invalid_request(None, "API base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Reject product numbers that cannot stand as a single path segment.
pub(crate) fn product_number(value: &str) -> Result<&str, UpstreamError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UpstreamError::invalid_request(
            None,
            "product_number must not be empty",
        ));
    }
    // URL path normalization would drop these segments entirely.
    if trimmed == "." || trimmed == ".." {
        return Err(UpstreamError::invalid_request(
            None,
            format!("product_number '{}' is not a valid part number", trimmed),
        ));
    }
    Ok(trimmed)
}
