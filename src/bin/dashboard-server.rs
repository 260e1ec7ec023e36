//! Stock Dashboard Server Binary
//!
//! Run with: `cargo run --bin dashboard-server`

use stock_dashboard::server::{init_tracing, run_server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level:
    //   RUST_LOG=debug cargo run --bin dashboard-server
    //   RUST_LOG=stock_dashboard::cache=debug cargo run --bin dashboard-server  (cache only)
    init_tracing();

    let config = ServerConfig::from_env();

    println!("Starting Stock Dashboard Server...");
    println!("   Host: {}", config.host);
    println!("   Port: {}", config.port);
    println!("   Prices: {}", config.downloader.base_url);
    println!();
    println!("Dashboard will be available at: http://{}", config.address());
    println!();
    println!("Available endpoints:");
    println!("  GET  /                          - Dashboard page");
    println!("  GET  /health                    - Health check");
    println!("  GET  /api/dashboard             - Chart, metrics and table (JSON)");
    println!("  GET  /api/dashboard/table.csv   - Table export (CSV)");
    println!("  GET  /api/cache                 - Price cache counters");
    println!();

    run_server(config).await?;

    Ok(())
}
