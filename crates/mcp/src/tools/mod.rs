pub mod compact;
pub mod limits;
pub mod pricing;
pub mod product;
pub mod search;
mod registry;

pub use pricing::{DigiReelPricingTool, PricingByQuantityTool, ProductPricingTool};
pub use product::{
    AlternatePackagingTool, AssociationsTool, MediaTool, ProductDetailsTool, SubstitutionsTool,
};
pub use registry::{
    json_schema_boolean, json_schema_integer, json_schema_object, json_schema_string, parse_args,
    render, Tool, ToolRegistry,
};
pub use search::{CategoriesTool, CategoryTool, KeywordSearchTool, ManufacturersTool};

use digikey_client::DigiKeyClient;
use std::sync::Arc;

pub(crate) fn default_customer_id() -> String {
    "0".to_string()
}

/// Build a registry holding every DigiKey tool.
pub fn digikey_registry(client: &DigiKeyClient) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    // Search
    registry.register(Arc::new(KeywordSearchTool::new(client.clone())));
    registry.register(Arc::new(ManufacturersTool::new(client.clone())));
    registry.register(Arc::new(CategoriesTool::new(client.clone())));
    registry.register(Arc::new(CategoryTool::new(client.clone())));

    // Products
    registry.register(Arc::new(ProductDetailsTool::new(client.clone())));
    registry.register(Arc::new(SubstitutionsTool::new(client.clone())));
    registry.register(Arc::new(MediaTool::new(client.clone())));
    registry.register(Arc::new(AlternatePackagingTool::new(client.clone())));
    registry.register(Arc::new(AssociationsTool::new(client.clone())));

    // Pricing
    registry.register(Arc::new(ProductPricingTool::new(client.clone())));
    registry.register(Arc::new(DigiReelPricingTool::new(client.clone())));
    registry.register(Arc::new(PricingByQuantityTool::new(client.clone())));

    registry
}
