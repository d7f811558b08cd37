//! Terminal notification bell.
//!
//! Keeps one push channel open for the given user and prints the badge
//! (`🔔 3 ●`) every time it changes. Commands on stdin:
//!
//! - `list`: show the notifications received so far
//! - `read <id>`: mark one notification read
//! - `read-all`: mark everything read
//!
//! Run with:
//! ```not_rust
//! cargo run --bin storebell-bell -- --token alice
//! cargo run --bin storebell-bell -- -t alice --ws-url ws://127.0.0.1:3000/notifications/ws --api-url http://127.0.0.1:3000
//! cargo run --bin storebell-bell -- -t alice --config bell.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use storebell_client::{
    ClientConfig, ClientError, Credential, IdlePolicy, NotificationId, NotificationService,
    presentation::{Badge, NotificationListener},
};
use storebell_shared::{logger::setup_logger, time::timestamp_to_rfc3339};

#[derive(Parser, Debug)]
#[command(name = "storebell-bell")]
#[command(about = "Live notification badge for the storefront", long_about = None)]
struct Args {
    /// Bearer token of the signed-in user
    #[arg(short = 't', long)]
    token: String,

    /// JSON file with a client configuration; flags below override it
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// WebSocket URL of the push channel
    #[arg(long)]
    ws_url: Option<String>,

    /// Base URL of the notifications REST API
    #[arg(long)]
    api_url: Option<String>,

    /// Close the channel whenever no component is subscribed
    #[arg(long)]
    disconnect_when_idle: bool,
}

fn load_config(args: &Args) -> Result<ClientConfig, ClientError> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(ws_url) = &args.ws_url {
        config.ws_url = ws_url.clone();
    }
    if let Some(api_url) = &args.api_url {
        config.api_url = api_url.clone();
    }
    if args.disconnect_when_idle {
        config.idle_policy = IdlePolicy::Disconnect;
    }
    Ok(config)
}

fn print_notifications(service: &NotificationService) {
    let notifications = service.notifications();
    if notifications.is_empty() {
        println!("(no notifications)");
        return;
    }
    for n in notifications {
        println!(
            "{} {} {} [{}]",
            if n.read { " " } else { "*" },
            timestamp_to_rfc3339(n.created_at),
            n.kind.as_str(),
            n.id
        );
    }
}

fn handle_command(service: &NotificationService, line: &str) {
    let mut words = line.split_whitespace();
    match (words.next(), words.next()) {
        (Some("list"), None) => print_notifications(service),
        (Some("read-all"), None) => service.mark_all_read(),
        (Some("read"), Some(raw)) => match NotificationId::try_from(raw) {
            Ok(id) => {
                if !service.mark_read(&id) {
                    println!("{} is unknown or already read", id);
                }
            }
            Err(e) => println!("{}", e),
        },
        (None, _) => {}
        _ => println!("commands: list | read <id> | read-all"),
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_BIN_NAME"), "storebell-client"], "info");

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let service = match NotificationService::new(config, Credential::new(args.token)) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to create notification service: {}", e);
            std::process::exit(1);
        }
    };

    let _listener = NotificationListener::mount(&service);
    let _badge = Badge::mount_with(&service, |line| println!("{}", line));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => handle_command(&service, &line),
                // stdin closed: keep showing the badge until Ctrl+C
                Ok(None) => {
                    let _ = tokio::signal::ctrl_c().await;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                    break;
                }
            },
        }
    }

    tracing::info!("Shutting down");
    service.stop().await;
}
