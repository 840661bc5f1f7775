//! Per-product endpoints: details, substitutions, media, packaging, associations.

use super::{endpoint, product_number};
use crate::client::DigiKeyClient;
use crate::error::RelayResult;

/// Product API for a single part number.
pub struct ProductApi<'a> {
    client: &'a DigiKeyClient,
}

impl<'a> ProductApi<'a> {
    pub(crate) fn new(client: &'a DigiKeyClient) -> Self {
        Self { client }
    }

    /// Full product details. `manufacturer_id` disambiguates common part
    /// numbers.
    pub async fn details(
        &self,
        product: &str,
        manufacturer_id: Option<&str>,
        customer_id: Option<&str>,
    ) -> RelayResult {
        let product = product_number(product)?;
        let mut url = endpoint(self.client, &[product, "productdetails"])?;
        if let Some(id) = manufacturer_id {
            url.query_pairs_mut().append_pair("manufacturerId", id);
        }
        self.client.http.get(url, customer_id).await
    }

    /// Substitute products.
    pub async fn substitutions(&self, product: &str, query: &SubstitutionsQuery) -> RelayResult {
        let product = product_number(product)?;
        let mut url = endpoint(self.client, &[product, "substitutions"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair(
                "excludeMarketPlaceProducts",
                if query.exclude_marketplace { "true" } else { "false" },
            );
            if let Some(options) = &query.search_options {
                pairs.append_pair("searchOptionList", options);
            }
        }
        self.client.http.get(url, None).await
    }

    /// Images, documents and videos.
    pub async fn media(&self, product: &str) -> RelayResult {
        let product = product_number(product)?;
        let url = endpoint(self.client, &[product, "media"])?;
        self.client.http.get(url, None).await
    }

    /// The same product in other packaging types.
    pub async fn alternate_packaging(&self, product: &str, customer_id: Option<&str>) -> RelayResult {
        let product = product_number(product)?;
        let url = endpoint(self.client, &[product, "alternatepackaging"])?;
        self.client.http.get(url, customer_id).await
    }

    /// Products commonly used together with this one.
    pub async fn associations(&self, product: &str, customer_id: Option<&str>) -> RelayResult {
        let product = product_number(product)?;
        let url = endpoint(self.client, &[product, "associations"])?;
        self.client.http.get(url, customer_id).await
    }
}

/// Query parameters of the substitutions endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionsQuery {
    pub limit: u32,
    pub search_options: Option<String>,
    pub exclude_marketplace: bool,
}

impl Default for SubstitutionsQuery {
    fn default() -> Self {
        Self {
            limit: 10,
            search_options: None,
            exclude_marketplace: false,
        }
    }
}
