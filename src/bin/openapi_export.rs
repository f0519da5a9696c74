// Prints the WebAdmin OpenAPI document as JSON.
// Usage: cargo run --bin openapi_export > openapi.json

use anyhow::{Context, Result};
use utoipa::OpenApi;
use webadmin::api::openapi::ApiDoc;

fn main() -> Result<()> {
    let doc = ApiDoc::openapi();

    let json = serde_json::to_string_pretty(&doc)
        .context("Failed to serialize OpenAPI spec to JSON")?;

    println!("{}", json);

    Ok(())
}
