// Per-product tools: details, substitutions, media, packaging, associations

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::compact::compact_details;
use crate::tools::limits::{clamp_limit, SUBSTITUTIONS_LIMIT_DEFAULT, SUBSTITUTIONS_LIMIT_MAX};
use crate::tools::{
    default_customer_id, json_schema_boolean, json_schema_integer, json_schema_object,
    json_schema_string, parse_args, render, Tool,
};
use anyhow::Result;
use digikey_client::{DigiKeyClient, SubstitutionsQuery};
use serde::Deserialize;

fn product_number_schema() -> serde_json::Value {
    json_schema_string("DigiKey or manufacturer part number")
}

fn customer_id_schema() -> serde_json::Value {
    json_schema_string("Customer ID for customer-specific pricing (default: \"0\")")
}

/// Tool to get full product details
pub struct ProductDetailsTool {
    client: DigiKeyClient,
}

impl ProductDetailsTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ProductDetailsArgs {
    product_number: String,
    #[serde(default)]
    manufacturer_id: Option<String>,
    #[serde(default = "default_customer_id")]
    customer_id: String,
    #[serde(default)]
    compact: bool,
}

#[async_trait::async_trait]
impl Tool for ProductDetailsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "product_details".to_string(),
            description: "Get detailed information for a specific product".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "product_number": product_number_schema(),
                    "manufacturer_id": json_schema_string("Manufacturer ID for disambiguation"),
                    "customer_id": customer_id_schema(),
                    "compact": json_schema_boolean("Return only the key product fields (default: false)")
                }),
                vec!["product_number"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ProductDetailsArgs = parse_args("product_details", arguments)?;

        let result = self
            .client
            .products()
            .details(
                &args.product_number,
                args.manufacturer_id.as_deref().filter(|s| !s.is_empty()),
                Some(&args.customer_id),
            )
            .await;

        Ok(render(result, |value| {
            if args.compact {
                compact_details(value)
            } else {
                value
            }
        }))
    }
}

/// Tool to find substitute products
pub struct SubstitutionsTool {
    client: DigiKeyClient,
}

impl SubstitutionsTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SubstitutionsArgs {
    product_number: String,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    search_options: Option<String>,
    #[serde(default)]
    exclude_marketplace: bool,
}

#[async_trait::async_trait]
impl Tool for SubstitutionsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_product_substitutions".to_string(),
            description: "Search for substitute products for a given product".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "product_number": product_number_schema(),
                    "limit": json_schema_integer("Number of substitutions (default: 10, max: 50)", 1, Some(SUBSTITUTIONS_LIMIT_MAX)),
                    "search_options": json_schema_string("Filters such as LeadFree,RoHSCompliant,InStock"),
                    "exclude_marketplace": json_schema_boolean("Exclude marketplace products (default: false)")
                }),
                vec!["product_number"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SubstitutionsArgs = parse_args("search_product_substitutions", arguments)?;
        let query = SubstitutionsQuery {
            limit: clamp_limit(args.limit, SUBSTITUTIONS_LIMIT_DEFAULT, SUBSTITUTIONS_LIMIT_MAX),
            search_options: args.search_options.filter(|s| !s.is_empty()),
            exclude_marketplace: args.exclude_marketplace,
        };

        let result = self
            .client
            .products()
            .substitutions(&args.product_number, &query)
            .await;
        Ok(render(result, |value| value))
    }
}

#[derive(Debug, Deserialize)]
struct ProductArgs {
    product_number: String,
    #[serde(default = "default_customer_id")]
    customer_id: String,
}

/// Tool to get product media
pub struct MediaTool {
    client: DigiKeyClient,
}

impl MediaTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for MediaTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_product_media".to_string(),
            description: "Get media (images, documents, videos) for a product".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "product_number": product_number_schema()
                }),
                vec!["product_number"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ProductArgs = parse_args("get_product_media", arguments)?;
        let result = self.client.products().media(&args.product_number).await;
        Ok(render(result, |value| value))
    }
}

/// Tool to list alternate packaging options
pub struct AlternatePackagingTool {
    client: DigiKeyClient,
}

impl AlternatePackagingTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for AlternatePackagingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_alternate_packaging".to_string(),
            description: "Get the same product in other packaging types (Tape & Reel, Cut Tape, Tube, Tray, Bulk, Digi-Reel) with pricing for each".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "product_number": product_number_schema(),
                    "customer_id": customer_id_schema()
                }),
                vec!["product_number"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ProductArgs = parse_args("get_alternate_packaging", arguments)?;
        let result = self
            .client
            .products()
            .alternate_packaging(&args.product_number, Some(&args.customer_id))
            .await;
        Ok(render(result, |value| value))
    }
}

/// Tool to list associated products
pub struct AssociationsTool {
    client: DigiKeyClient,
}

impl AssociationsTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for AssociationsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_product_associations".to_string(),
            description: "Get products commonly used together with this one (mating connectors, support components)".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "product_number": product_number_schema(),
                    "customer_id": customer_id_schema()
                }),
                vec!["product_number"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ProductArgs = parse_args("get_product_associations", arguments)?;
        let result = self
            .client
            .products()
            .associations(&args.product_number, Some(&args.customer_id))
            .await;
        Ok(render(result, |value| value))
    }
}
