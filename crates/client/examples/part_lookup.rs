//! Look up a part: keyword search, then pricing for the first hit.
//!
//! Run with:
//! CLIENT_ID=... CLIENT_SECRET=... cargo run --example part_lookup -- LM358

use digikey_client::{DigiKeyClient, DigiKeyResult, Environment, KeywordSearchRequest};

#[tokio::main]
async fn main() -> DigiKeyResult<()> {
    tracing_subscriber::fmt::init();

    let keywords = std::env::args().nth(1).unwrap_or_else(|| "LM358".to_string());
    let sandbox = std::env::var("USE_SANDBOX").is_ok_and(|v| v.eq_ignore_ascii_case("true"));

    let client = DigiKeyClient::builder()
        .credentials(
            std::env::var("CLIENT_ID").unwrap_or_default(),
            std::env::var("CLIENT_SECRET").unwrap_or_default(),
        )
        .environment(Environment::from_sandbox_flag(sandbox))
        .connect()
        .await?;

    println!("Searching for {}...", keywords);
    let results = match client.search().keyword(&KeywordSearchRequest::new(&keywords, 3)).await {
        Ok(results) => results,
        Err(err) => {
            eprintln!("Search failed: {}", err.to_json());
            return Ok(());
        }
    };

    let Some(first) = results["Products"].get(0) else {
        println!("No products found");
        return Ok(());
    };

    println!(
        "First hit: {} ({})",
        first["ManufacturerProductNumber"],
        first["Description"]["ProductDescription"]
    );

    let Some(part) = first["ManufacturerProductNumber"].as_str() else {
        return Ok(());
    };

    match client.pricing().product_pricing(part, 100, None).await {
        Ok(pricing) => println!("{:#}", pricing),
        Err(err) => eprintln!("Pricing failed: {}", err.to_json()),
    }

    Ok(())
}
