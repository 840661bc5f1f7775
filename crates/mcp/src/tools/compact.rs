// Compaction of heavy product payloads
//
// Product records from the search and details endpoints run to several
// kilobytes each. Compact mode keeps the fields an agent needs to pick a
// part and drops parameters, filter options and media.

use serde_json::{Map, Value};

/// Reduce a single product record.
pub fn compact_product(product: &Value) -> Value {
    let mut out = Map::new();

    let digikey_number = product
        .get("DigiKeyProductNumber")
        .cloned()
        .or_else(|| {
            product
                .get("ProductVariations")
                .and_then(|v| v.get(0))
                .and_then(|v| v.get("DigiKeyProductNumber"))
                .cloned()
        });
    insert(&mut out, "DigiKeyProductNumber", digikey_number);
    insert(&mut out, "ManufacturerProductNumber", product.get("ManufacturerProductNumber").cloned());
    insert(&mut out, "Manufacturer", nested_or_self(product.get("Manufacturer"), "Name"));
    insert(&mut out, "Description", nested_or_self(product.get("Description"), "ProductDescription"));
    insert(&mut out, "QuantityAvailable", product.get("QuantityAvailable").cloned());
    insert(&mut out, "UnitPrice", product.get("UnitPrice").cloned());
    insert(&mut out, "ProductStatus", nested_or_self(product.get("ProductStatus"), "Status"));
    insert(&mut out, "ProductUrl", product.get("ProductUrl").cloned());
    insert(&mut out, "DatasheetUrl", product.get("DatasheetUrl").cloned());

    Value::Object(out)
}

/// Reduce a keyword search response to counts and compact products.
pub fn compact_search(result: Value) -> Value {
    let mut out = Map::new();

    insert(&mut out, "ProductsCount", result.get("ProductsCount").cloned());
    for key in ["ExactMatches", "Products"] {
        if let Some(items) = result.get(key).and_then(Value::as_array) {
            out.insert(
                key.to_string(),
                Value::Array(items.iter().map(compact_product).collect()),
            );
        }
    }

    Value::Object(out)
}

/// Reduce a product details response.
pub fn compact_details(result: Value) -> Value {
    match result.get("Product") {
        Some(product) => serde_json::json!({ "Product": compact_product(product) }),
        None => compact_product(&result),
    }
}

/// `value[key]` when `value` is an object, else `value` itself.
fn nested_or_self(value: Option<&Value>, key: &str) -> Option<Value> {
    match value? {
        Value::Object(map) => map.get(key).cloned(),
        Value::Null => None,
        other => Some(other.clone()),
    }
}

fn insert(out: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value.filter(|v| !v.is_null()) {
        out.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product() -> Value {
        json!({
            "Description": {
                "ProductDescription": "IC OPAMP GP 2 CIRCUIT 8DIP",
                "DetailedDescription": "General Purpose Amplifier 2 Circuit 8-PDIP"
            },
            "Manufacturer": {"Id": 296, "Name": "Texas Instruments"},
            "ManufacturerProductNumber": "LM358P",
            "UnitPrice": 0.42,
            "ProductUrl": "https://www.digikey.com/en/products/detail/LM358P",
            "DatasheetUrl": "https://www.ti.com/lit/ds/lm358.pdf",
            "QuantityAvailable": 25000,
            "ProductStatus": {"Id": 0, "Status": "Active"},
            "Parameters": [{"ParameterText": "Voltage", "ValueText": "32V"}],
            "ProductVariations": [
                {"DigiKeyProductNumber": "296-1395-5-ND", "PackageType": {"Name": "Tube"}}
            ]
        })
    }

    #[test]
    fn test_compact_product_keeps_core_fields() {
        let compact = compact_product(&product());
        assert_eq!(
            compact,
            json!({
                "DigiKeyProductNumber": "296-1395-5-ND",
                "ManufacturerProductNumber": "LM358P",
                "Manufacturer": "Texas Instruments",
                "Description": "IC OPAMP GP 2 CIRCUIT 8DIP",
                "QuantityAvailable": 25000,
                "UnitPrice": 0.42,
                "ProductStatus": "Active",
                "ProductUrl": "https://www.digikey.com/en/products/detail/LM358P",
                "DatasheetUrl": "https://www.ti.com/lit/ds/lm358.pdf"
            })
        );
    }

    #[test]
    fn test_compact_search() {
        let result = json!({
            "ProductsCount": 1,
            "Products": [product()],
            "ExactMatches": [],
            "FilterOptions": {"Manufacturers": [{"Id": 296}]}
        });

        let compact = compact_search(result);
        assert_eq!(compact["ProductsCount"], 1);
        assert_eq!(compact["Products"][0]["ManufacturerProductNumber"], "LM358P");
        assert_eq!(compact["ExactMatches"], json!([]));
        assert!(compact.get("FilterOptions").is_none());
    }

    #[test]
    fn test_compact_details_wrapped_and_bare() {
        let wrapped = compact_details(json!({"Product": product(), "SearchLocaleUsed": {}}));
        assert_eq!(wrapped["Product"]["Manufacturer"], "Texas Instruments");
        assert!(wrapped.get("SearchLocaleUsed").is_none());

        let bare = compact_details(json!({"ManufacturerProductNumber": "X1"}));
        assert_eq!(bare, json!({"ManufacturerProductNumber": "X1"}));
    }
}
