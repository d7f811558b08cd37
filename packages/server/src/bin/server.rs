//! Development push server for the Storebell notification bell.
//!
//! Serves the notifications REST API and the WebSocket push channel from
//! in-memory feeds. The bearer token is taken as the user id.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin storebell-server
//! cargo run --bin storebell-server -- --host 0.0.0.0 --port 3000 --heartbeat-secs 5
//! ```
//!
//! Publish a notification for user `alice`:
//! ```not_rust
//! curl -X POST http://127.0.0.1:8080/notifications \
//!      -H 'Authorization: Bearer alice' -H 'Content-Type: application/json' \
//!      -d '{"kind":"order-update","payload":{"orderId":42}}'
//! ```

use std::time::Duration;

use clap::Parser;

use storebell_server::ui::Server;
use storebell_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "storebell-server")]
#[command(about = "Development push server for the notification bell", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds between heartbeat frames on each push session
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..))]
    heartbeat_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_BIN_NAME"), "tower-http"], "debug");

    let args = Args::parse();

    let server = Server::in_memory(Duration::from_secs(args.heartbeat_secs));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
