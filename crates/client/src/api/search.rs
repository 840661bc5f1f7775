//! Keyword search and catalog listing endpoints.

use super::endpoint;
use crate::client::DigiKeyClient;
use crate::error::{RelayResult, UpstreamError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Search API: keyword search, manufacturers, categories.
pub struct SearchApi<'a> {
    client: &'a DigiKeyClient,
}

impl<'a> SearchApi<'a> {
    pub(crate) fn new(client: &'a DigiKeyClient) -> Self {
        Self { client }
    }

    /// Search products by keyword or part number.
    pub async fn keyword(&self, request: &KeywordSearchRequest) -> RelayResult {
        if request.keywords.trim().is_empty() {
            return Err(UpstreamError::invalid_request(None, "keywords must not be empty"));
        }

        let url = endpoint(self.client, &["keyword"])?;
        let body = serde_json::to_value(request)
            .map_err(|e| UpstreamError::invalid_request(Some(url.as_str()), e.to_string()))?;

        self.client.http.post(url, None, &body).await
    }

    /// List all manufacturers.
    pub async fn manufacturers(&self) -> RelayResult {
        let url = endpoint(self.client, &["manufacturers"])?;
        self.client.http.get(url, None).await
    }

    /// List all categories.
    pub async fn categories(&self) -> RelayResult {
        let url = endpoint(self.client, &["categories"])?;
        self.client.http.get(url, None).await
    }

    /// Get a single category by ID.
    pub async fn category(&self, category_id: u64) -> RelayResult {
        let id = category_id.to_string();
        let url = endpoint(self.client, &["categories", id.as_str()])?;
        self.client.http.get(url, None).await
    }
}

/// Request body of `POST /products/v4/search/keyword`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeywordSearchRequest {
    pub keywords: String,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_option_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_options: Option<SortOptions>,
}

impl KeywordSearchRequest {
    pub fn new(keywords: impl Into<String>, limit: u32) -> Self {
        Self {
            keywords: keywords.into(),
            limit,
            ..Default::default()
        }
    }

    /// Set search options from a comma-delimited list such as
    /// `LeadFree,RoHSCompliant,InStock`.
    pub fn with_search_options(mut self, options: &str) -> Self {
        self.search_option_list = options
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SortOptions {
    pub field: String,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(Self::Ascending),
            "descending" | "desc" => Ok(Self::Descending),
            other => Err(format!(
                "Invalid sort order '{}': expected Ascending or Descending",
                other
            )),
        }
    }
}
