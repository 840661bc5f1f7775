// Pricing tools

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    default_customer_id, json_schema_integer, json_schema_object, json_schema_string, parse_args,
    render, Tool,
};
use anyhow::Result;
use digikey_client::DigiKeyClient;
use serde::Deserialize;

fn default_quantity() -> u32 {
    1
}

fn pricing_properties(quantity_description: &str) -> serde_json::Value {
    serde_json::json!({
        "product_number": json_schema_string("DigiKey or manufacturer part number"),
        "requested_quantity": json_schema_integer(quantity_description, 1, None),
        "customer_id": json_schema_string("Customer ID for customer-specific pricing (default: \"0\")")
    })
}

#[derive(Debug, Deserialize)]
struct ProductPricingArgs {
    product_number: String,
    #[serde(default = "default_quantity")]
    requested_quantity: u32,
    #[serde(default = "default_customer_id")]
    customer_id: String,
}

/// Arguments where the quantity is mandatory.
#[derive(Debug, Deserialize)]
struct QuantityPricingArgs {
    product_number: String,
    requested_quantity: u32,
    #[serde(default = "default_customer_id")]
    customer_id: String,
}

#[derive(Debug, Deserialize)]
struct PricingByQuantityArgs {
    product_number: String,
    requested_quantity: u32,
    #[serde(default)]
    manufacturer_id: Option<String>,
    #[serde(default = "default_customer_id")]
    customer_id: String,
}

/// Tool to get price breaks for a product
pub struct ProductPricingTool {
    client: DigiKeyClient,
}

impl ProductPricingTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ProductPricingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_product_pricing".to_string(),
            description: "Get detailed pricing information for a product".to_string(),
            input_schema: json_schema_object(
                pricing_properties("Quantity for the pricing calculation (default: 1)"),
                vec!["product_number"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: ProductPricingArgs = parse_args("get_product_pricing", arguments)?;
        let result = self
            .client
            .pricing()
            .product_pricing(&args.product_number, args.requested_quantity, Some(&args.customer_id))
            .await;
        Ok(render(result, |value| value))
    }
}

/// Tool to get Digi-Reel pricing
pub struct DigiReelPricingTool {
    client: DigiKeyClient,
}

impl DigiReelPricingTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for DigiReelPricingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_digi_reel_pricing".to_string(),
            description: "Get Digi-Reel pricing for a Digi-Reel compatible product".to_string(),
            input_schema: json_schema_object(
                pricing_properties("Quantity for Digi-Reel pricing"),
                vec!["product_number", "requested_quantity"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: QuantityPricingArgs = parse_args("get_digi_reel_pricing", arguments)?;
        let result = self
            .client
            .pricing()
            .digi_reel(&args.product_number, args.requested_quantity, Some(&args.customer_id))
            .await;
        Ok(render(result, |value| value))
    }
}

/// Tool to get pricing scenarios for a quantity
pub struct PricingByQuantityTool {
    client: DigiKeyClient,
}

impl PricingByQuantityTool {
    pub fn new(client: DigiKeyClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for PricingByQuantityTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = pricing_properties("Desired quantity");
        properties["manufacturer_id"] =
            json_schema_string("Manufacturer ID for disambiguation of common parts such as CR2032");

        ToolSchema {
            name: "get_pricing_by_quantity".to_string(),
            description: "Get up to four pricing options for a quantity: exact quantity, minimum order, maximum order and better value (standard package with lower total cost)".to_string(),
            input_schema: json_schema_object(properties, vec!["product_number", "requested_quantity"]),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: PricingByQuantityArgs = parse_args("get_pricing_by_quantity", arguments)?;
        let result = self
            .client
            .pricing()
            .by_quantity(
                &args.product_number,
                args.requested_quantity,
                args.manufacturer_id.as_deref().filter(|s| !s.is_empty()),
                Some(&args.customer_id),
            )
            .await;
        Ok(render(result, |value| value))
    }
}
