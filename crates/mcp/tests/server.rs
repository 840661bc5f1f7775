//! Drives the MCP server against a mock DigiKey API.

use digikey_client::DigiKeyClient;
use digikey_mcp::protocol::JsonRpcResponse;
use digikey_mcp::{digikey_registry, McpServer};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup(token_fetches: u64) -> (MockServer, McpServer) {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "mcp-token",
            "expires_in": 3600
        })))
        .expect(token_fetches)
        .mount(&upstream)
        .await;

    let client = DigiKeyClient::builder()
        .credentials("mcp-client", "mcp-secret")
        .api_base(upstream.uri())
        .build()
        .unwrap();

    (upstream, McpServer::new(digikey_registry(&client)))
}

async fn call_tool(server: &McpServer, id: u64, name: &str, arguments: Value) -> Value {
    let request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": name, "arguments": arguments}
    });
    let response: JsonRpcResponse = server.handle_message(&request.to_string()).await.unwrap();
    assert_eq!(response.id, json!(id));
    response.result.expect("tools/call should not be a protocol error")
}

fn payload(result: &Value) -> Value {
    serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn lists_every_tool() {
    let (_upstream, server) = setup(0).await;
    let response = server
        .handle_message(r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#)
        .await
        .unwrap();

    let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names.len(), 12);
    for expected in [
        "keyword_search",
        "product_details",
        "search_manufacturers",
        "search_categories",
        "get_category_by_id",
        "search_product_substitutions",
        "get_product_media",
        "get_product_pricing",
        "get_digi_reel_pricing",
        "get_pricing_by_quantity",
        "get_alternate_packaging",
        "get_product_associations",
    ] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn keyword_search_clamps_limit_and_compacts() {
    let (upstream, server) = setup(1).await;

    Mock::given(method("POST"))
        .and(path("/products/v4/search/keyword"))
        .and(body_json(json!({"Keywords": "LM358", "Limit": 50})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ProductsCount": 1,
            "ExactMatches": [],
            "Products": [{
                "ManufacturerProductNumber": "LM358DR",
                "Manufacturer": {"Id": 296, "Name": "Texas Instruments"},
                "Description": {"ProductDescription": "IC OPAMP GP 2 CIRCUIT 8SOIC"},
                "QuantityAvailable": 120000,
                "UnitPrice": 0.42,
                "ProductVariations": [{"DigiKeyProductNumber": "296-1395-1-ND"}],
                "Parameters": [{"ParameterText": "Voltage", "ValueText": "32V"}]
            }],
            "AppliedParametricFiltersDto": []
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let result = call_tool(
        &server,
        1,
        "keyword_search",
        json!({"keywords": "LM358", "limit": 200, "compact": true}),
    )
    .await;

    assert!(result.get("isError").is_none());
    let body = payload(&result);
    assert_eq!(body["ProductsCount"], 1);
    assert!(body.get("AppliedParametricFiltersDto").is_none());

    let product = &body["Products"][0];
    assert_eq!(product["DigiKeyProductNumber"], "296-1395-1-ND");
    assert_eq!(product["Manufacturer"], "Texas Instruments");
    assert!(product.get("Parameters").is_none());
}

#[tokio::test]
async fn upstream_not_found_is_tool_error() {
    let (upstream, server) = setup(1).await;

    Mock::given(method("GET"))
        .and(path("/products/v4/search/NOPE-123/productdetails"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
        .mount(&upstream)
        .await;

    let result = call_tool(&server, 7, "product_details", json!({"product_number": "NOPE-123"})).await;

    assert_eq!(result["isError"], true);
    let body = payload(&result);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["status_code"], 404);
}

#[tokio::test]
async fn manufacturers_listing_is_truncated() {
    let (upstream, server) = setup(1).await;

    let manufacturers: Vec<Value> = (0..20).map(|i| json!({"Id": i, "Name": format!("M{}", i)})).collect();
    Mock::given(method("GET"))
        .and(path("/products/v4/search/manufacturers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Manufacturers": manufacturers})))
        .mount(&upstream)
        .await;

    let result = call_tool(&server, 2, "search_manufacturers", json!({"limit": 3})).await;
    let body = payload(&result);
    assert_eq!(body["Manufacturers"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn concurrent_calls_share_one_token() {
    let (upstream, server) = setup(1).await;

    Mock::given(method("GET"))
        .and(path("/products/v4/search/P1/productpricing"))
        .and(query_param("requestedQuantity", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ProductPricings": []})))
        .expect(8)
        .mount(&upstream)
        .await;

    let mut handles = Vec::new();
    for id in 0..8u64 {
        let server = server.clone();
        handles.push(tokio::spawn(async move {
            call_tool(&server, id, "get_product_pricing", json!({"product_number": "P1"})).await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.get("isError").is_none());
    }
}

#[tokio::test]
async fn missing_required_argument_is_tool_error() {
    let (_upstream, server) = setup(0).await;

    let result = call_tool(&server, 3, "get_product_pricing", json!({"requested_quantity": 5})).await;

    assert_eq!(result["isError"], true);
    assert_eq!(payload(&result)["error"], "invalid_request");
}

#[tokio::test]
async fn reel_and_quantity_pricing_require_a_quantity() {
    let (upstream, server) = setup(0).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&upstream)
        .await;

    for (id, tool) in [(10, "get_digi_reel_pricing"), (11, "get_pricing_by_quantity")] {
        let result = call_tool(&server, id, tool, json!({"product_number": "LM358"})).await;

        assert_eq!(result["isError"], true, "{} accepted a missing quantity", tool);
        let body = payload(&result);
        assert_eq!(body["error"], "invalid_request");
        assert!(body["message"].as_str().unwrap().contains("requested_quantity"));
    }
}

#[tokio::test]
async fn digi_reel_pricing_passes_quantity() {
    let (upstream, server) = setup(1).await;

    Mock::given(method("GET"))
        .and(path("/products/v4/search/LM358/digireelpricing"))
        .and(query_param("requestedQuantity", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ReelingFee": 7})))
        .expect(1)
        .mount(&upstream)
        .await;

    let result = call_tool(
        &server,
        12,
        "get_digi_reel_pricing",
        json!({"product_number": "LM358", "requested_quantity": 250}),
    )
    .await;
    assert!(result.get("isError").is_none());
    assert_eq!(payload(&result)["ReelingFee"], 7);
}
