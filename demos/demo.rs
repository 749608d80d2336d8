//! Demo application for the FlagOps data store provider.
//!
//! Stores a fact for an identity, then evaluates a flag for that identity
//! through the OpenFeature SDK. The wrapped provider is OpenFeature's no-op
//! provider, so evaluations return defaults; the point is to show the wiring
//! and the data store traffic in the logs.
//!
//! ## Running
//!
//! ```bash
//! FLAGOPS_DATA_STORE_URL=http://localhost:8080 RUST_LOG=debug cargo run --example demo
//! ```

use flagops_datastore_provider::{DataStoreProvider, ProviderOptions};
use open_feature::provider::NoOpProvider;
use open_feature::{EvaluationContext, OpenFeature};

const DEFAULT_DATA_STORE_URL: &str = "http://localhost:8080";
const FLAG_KEY: &str = "new-checkout";
const TARGETING_KEY: &str = "alice";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let base_url = std::env::var("FLAGOPS_DATA_STORE_URL")
        .unwrap_or_else(|_| DEFAULT_DATA_STORE_URL.to_string());

    println!("=== FlagOps Data Store Provider Demo ===");
    println!("Data store: {}", base_url);
    println!();

    let options = ProviderOptions::new(base_url).with_request_timeout(2_000);
    let provider = DataStoreProvider::with_options(options, NoOpProvider::default())?;

    // Direct accessors
    println!("--- Facts for {} ---", TARGETING_KEY);
    match provider.set_identity_fact(TARGETING_KEY, "plan", "pro").await {
        Ok(()) => println!("  Stored plan=pro"),
        Err(e) => println!("  Error storing fact: {}", e),
    }
    match provider.get_identity_facts(TARGETING_KEY).await {
        Ok(facts) => {
            for (key, value) in &facts {
                println!("  {} = {}", key, value);
            }
        }
        Err(e) => println!("  Error reading facts: {}", e),
    }
    println!();

    // Evaluation through OpenFeature
    OpenFeature::singleton_mut().await.set_provider(provider).await;
    let client = OpenFeature::singleton().await.create_client();

    let context = EvaluationContext::default()
        .with_targeting_key(TARGETING_KEY)
        .with_custom_field("environment", "production");

    println!("--- Boolean: {} ---", FLAG_KEY);
    match client
        .get_bool_details(FLAG_KEY, Some(&context), None)
        .await
    {
        Ok(details) => {
            println!("  Value: {}", details.value);
            println!("  Variant: {:?}", details.variant);
            println!("  Reason: {:?}", details.reason);
        }
        Err(e) => println!("  Error: {:?}", e),
    }
    println!();

    OpenFeature::singleton_mut().await.shutdown().await;
    println!("Done!");

    Ok(())
}
