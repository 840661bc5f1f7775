//! Pricing endpoints.

use super::{endpoint, product_number};
use crate::client::DigiKeyClient;
use crate::error::{RelayResult, UpstreamError};

/// Pricing API. All calls honor the customer id for customer-specific
/// pricing; `None` means anonymous list pricing.
pub struct PricingApi<'a> {
    client: &'a DigiKeyClient,
}

impl<'a> PricingApi<'a> {
    pub(crate) fn new(client: &'a DigiKeyClient) -> Self {
        Self { client }
    }

    /// Price breaks for a product.
    pub async fn product_pricing(
        &self,
        product: &str,
        requested_quantity: u32,
        customer_id: Option<&str>,
    ) -> RelayResult {
        let product = product_number(product)?;
        let quantity = quantity(requested_quantity)?;
        let mut url = endpoint(self.client, &[product, "productpricing"])?;
        url.query_pairs_mut()
            .append_pair("requestedQuantity", &quantity);
        self.client.http.get(url, customer_id).await
    }

    /// Digi-Reel pricing; the product must be Digi-Reel compatible.
    pub async fn digi_reel(
        &self,
        product: &str,
        requested_quantity: u32,
        customer_id: Option<&str>,
    ) -> RelayResult {
        let product = product_number(product)?;
        let quantity = quantity(requested_quantity)?;
        let mut url = endpoint(self.client, &[product, "digireelpricing"])?;
        url.query_pairs_mut()
            .append_pair("requestedQuantity", &quantity);
        self.client.http.get(url, customer_id).await
    }

    /// Pricing scenarios for an exact quantity (exact, minimum order,
    /// maximum order, better value).
    pub async fn by_quantity(
        &self,
        product: &str,
        requested_quantity: u32,
        manufacturer_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> RelayResult {
        let product = product_number(product)?;
        let quantity = quantity(requested_quantity)?;
        let mut url = endpoint(
            self.client,
            &[product, "pricingbyquantity", quantity.as_str()],
        )?;
        if let Some(id) = manufacturer_id {
            url.query_pairs_mut().append_pair("manufacturerId", id);
        }
        self.client.http.get(url, customer_id).await
    }
}

fn quantity(requested: u32) -> Result<String, UpstreamError> {
    if requested == 0 {
        return Err(UpstreamError::invalid_request(
            None,
            "requested_quantity must be at least 1",
        ));
    }
    Ok(requested.to_string())
}
