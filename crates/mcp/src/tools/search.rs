// Search tools: keyword search and catalog listings

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::compact::compact_search;
use crate::tools::limits::{
    clamp_limit, truncate_list, KEYWORD_LIMIT_DEFAULT, KEYWORD_LIMIT_MAX, LISTING_LIMIT_MAX,
};
use crate::tools::{
    json_schema_boolean, json_schema_integer, json_schema_object, json_schema_string, parse_args,
    render, Tool,
};
use anyhow::{anyhow, Result};
use digikey_client::{DigiKeyClient, KeywordSearchRequest, SortOptions, SortOrder};
use serde::Deserialize;

/// Tool to search products by keyword or part number
pub struct KeywordSearchTool {
    client: DigiKeyClient,
}

impl KeywordSearchTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct KeywordSearchArgs {
    keywords: String,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    offset: Option<u32>,
    #[serde(default)]
    manufacturer_id: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
    #[serde(default)]
    search_options: Option<String>,
    #[serde(default)]
    sort_field: Option<String>,
    #[serde(default)]
    sort_order: Option<String>,
    #[serde(default)]
    compact: bool,
}

impl KeywordSearchArgs {
    fn into_request(self) -> Result<KeywordSearchRequest> {
        let limit = clamp_limit(self.limit, KEYWORD_LIMIT_DEFAULT, KEYWORD_LIMIT_MAX);
        let mut request = KeywordSearchRequest::new(self.keywords, limit);

        if let Some(options) = self.search_options.as_deref() {
            request = request.with_search_options(options);
        }
        request.offset = self.offset;
        request.manufacturer_id = self.manufacturer_id.filter(|s| !s.is_empty());
        request.category_id = self.category_id.filter(|s| !s.is_empty());

        if let Some(field) = self.sort_field.filter(|s| !s.is_empty()) {
            let sort_order = match self.sort_order.as_deref() {
                Some(order) => order.parse::<SortOrder>().map_err(|e| anyhow!(e))?,
                None => SortOrder::default(),
            };
            request.sort_options = Some(SortOptions { field, sort_order });
        }

        Ok(request)
    }
}

#[async_trait::async_trait]
impl Tool for KeywordSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "keyword_search".to_string(),
            description: "Search DigiKey products by keyword or part number".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "keywords": json_schema_string("Search terms or part numbers"),
                    "limit": json_schema_integer("Maximum number of results (default: 5, max: 50)", 1, Some(KEYWORD_LIMIT_MAX)),
                    "offset": json_schema_integer("Number of results to skip, for paging", 0, None),
                    "manufacturer_id": json_schema_string("Filter by manufacturer ID"),
                    "category_id": json_schema_string("Filter by category ID"),
                    "search_options": json_schema_string("Comma-delimited filters such as LeadFree,RoHSCompliant,InStock"),
                    "sort_field": json_schema_string("Sort field: Packaging, ProductStatus, DigiKeyProductNumber, ManufacturerProductNumber, Manufacturer, MinimumQuantity, QuantityAvailable, Price, Supplier, PriceManufacturerStandardPackage"),
                    "sort_order": json_schema_string("Ascending or Descending (default: Ascending)"),
                    "compact": json_schema_boolean("Return only the key fields of each product (default: false)")
                }),
                vec!["keywords"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: KeywordSearchArgs = parse_args("keyword_search", arguments)?;
        let compact = args.compact;
        let request = args.into_request()?;

        let result = self.client.search().keyword(&request).await;
        Ok(render(result, |value| {
            if compact {
                compact_search(value)
            } else {
                value
            }
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ListingArgs {
    #[serde(default)]
    limit: Option<u32>,
}

/// Tool to list all manufacturers
pub struct ManufacturersTool {
    client: DigiKeyClient,
}

impl ManufacturersTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ManufacturersTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_manufacturers".to_string(),
            description: "List all product manufacturers".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "limit": json_schema_integer("Maximum number of manufacturers (default and max: 500)", 1, Some(LISTING_LIMIT_MAX))
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ListingArgs = parse_args("search_manufacturers", arguments)?;
        let limit = clamp_limit(args.limit, LISTING_LIMIT_MAX, LISTING_LIMIT_MAX);

        let result = self.client.search().manufacturers().await;
        Ok(render(result, |value| truncate_list(value, "Manufacturers", limit)))
    }
}

/// Tool to list all categories
pub struct CategoriesTool {
    client: DigiKeyClient,
}

impl CategoriesTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for CategoriesTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_categories".to_string(),
            description: "List all product categories".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "limit": json_schema_integer("Maximum number of top-level categories (default and max: 500)", 1, Some(LISTING_LIMIT_MAX))
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ListingArgs = parse_args("search_categories", arguments)?;
        let limit = clamp_limit(args.limit, LISTING_LIMIT_MAX, LISTING_LIMIT_MAX);

        let result = self.client.search().categories().await;
        Ok(render(result, |value| truncate_list(value, "Categories", limit)))
    }
}

/// Tool to get one category
pub struct CategoryTool {
    client: DigiKeyClient,
}

impl CategoryTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryArgs {
    category_id: u64,
}

#[async_trait::async_trait]
impl Tool for CategoryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_category_by_id".to_string(),
            description: "Get details of a specific category by ID".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "category_id": json_schema_integer("The category ID to retrieve", 0, None)
                }),
                vec!["category_id"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: CategoryArgs = parse_args("get_category_by_id", arguments)?;
        let result = self.client.search().category(args.category_id).await;
        Ok(render(result, |value| value))
    }
}
