//! REST API demonstration.
//!
//! Demonstrates:
//! - Building a client from `OPENSLAM_*` environment variables
//! - Listing plugins and datasets with query parameters
//! - Inspecting HTTP errors by status
//!
//! Usage:
//!   cargo run --example 001_rest_calls
//!   cargo run --example 001_rest_calls -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use anyhow::Context;

use common::Args;
use openslam_client::{ClientBuilder, Query};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    println!("=== 001: REST calls ===\n");

    let client = ClientBuilder::from_env()
        .context("reading OPENSLAM_* variables")?
        .build()
        .context("building client")?;
    println!("[Setup] API at {}", client.api().base_url());

    // ========================================================================
    // System
    // ========================================================================

    let status = client.api().system().status().await.context("system status")?;
    println!("[System] {status}");

    // ========================================================================
    // Plugins & datasets
    // ========================================================================

    let plugins = client.api().plugins().list().await.context("listing plugins")?;
    println!("[Plugins] {plugins}");

    let datasets = client
        .api()
        .datasets()
        .list(&Query::new().param("limit", 5))
        .await
        .context("listing datasets")?;
    println!("[Datasets] {datasets}");

    // ========================================================================
    // Error handling
    // ========================================================================

    match client.api().evaluations().get("does-not-exist").await {
        Ok(found) => println!("[Evaluations] unexpectedly found {found}"),
        Err(e) if e.is_not_found() => println!("[Evaluations] 404: {e}"),
        Err(e) => return Err(e).context("fetching evaluation"),
    }

    println!("\n=== Done ===");
    Ok(())
}
