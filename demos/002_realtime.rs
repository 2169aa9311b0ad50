//! Realtime event stream demonstration.
//!
//! Demonstrates:
//! - Subscribing to evaluation events
//! - Connecting with automatic reconnect
//! - Sending a frame and disconnecting cleanly
//!
//! Usage:
//!   cargo run --example 002_realtime
//!   cargo run --example 002_realtime -- --no-wait
//!   cargo run --example 002_realtime -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use anyhow::Context;
use serde_json::json;

use common::Args;
use openslam_client::ClientBuilder;
use openslam_client::realtime::events;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    println!("=== 002: Realtime ===\n");

    let client = ClientBuilder::from_env()?.build()?;
    let ws = client.realtime();

    ws.on(events::CONNECT, |_| println!("[Event] connected"));
    ws.on(events::DISCONNECT, |_| println!("[Event] disconnected"));
    ws.on(events::ERROR, |err| println!("[Event] error: {err}"));
    ws.on(events::EVALUATION_COMPLETE, |payload| {
        println!("[Event] evaluation complete: {payload}");
    });
    ws.on(events::EVALUATION_FAILED, |payload| {
        println!("[Event] evaluation failed: {payload}");
    });

    println!("[Setup] Connecting to {}", ws.url());
    ws.connect()
        .await
        .with_context(|| format!("connecting to {}", ws.url()))?;

    let sent = ws.send("ping", json!({ "client": "demo" }));
    println!("[Send] ping sent: {sent}");

    common::wait_for_exit(args.no_wait).await;

    ws.disconnect();
    println!("\n=== Done ===");
    Ok(())
}
