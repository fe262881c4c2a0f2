//! eslink Event Logger
//!
//! Subscribes to events and prints each one as a JSON line.

use std::io::{self, Write};

use clap::Parser;
use eslink::config::load_env_file;
use eslink::{Client, Config};
use tracing_subscriber::{fmt, EnvFilter};

/// eslink event logger
#[derive(Parser, Debug)]
#[command(name = "eslink-events")]
#[command(about = "Stream switch events to stdout as JSON lines")]
#[command(version)]
struct Args {
    /// Switch address (host[:port])
    #[arg(short, long, env = "ESL_ADDR", default_value = "localhost")]
    addr: String,

    /// Event socket password
    #[arg(short, long, env = "ESL_PASSWORD", default_value = "ClueCon", hide_env_values = true)]
    password: String,

    /// Event channel capacity
    #[arg(long, default_value = "64")]
    buffer: usize,

    /// Event names to subscribe to (default: all)
    events: Vec<String>,
}

fn main() {
    // Logs go to stderr; stdout carries the events
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,eslink=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = load_env_file(".env") {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    let args = Args::parse();

    tracing::info!("eslink-events v{}", eslink::VERSION);
    tracing::info!("Switch address: {}", args.addr);

    let (tx, rx) = crossbeam::channel::bounded(args.buffer);
    let config = Config::builder().events(tx, true).build();

    let client = match Client::connect(&args.addr, &args.password, config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = client.subscribe(&args.events) {
        tracing::error!("Failed to subscribe: {}", e);
        std::process::exit(1);
    }

    let stdout = io::stdout();
    for event in rx.iter() {
        let mut out = stdout.lock();
        let written = serde_json::to_writer(&mut out, &event)
            .map_err(io::Error::from)
            .and_then(|_| writeln!(out));

        if let Err(e) = written {
            tracing::error!("Failed to write event: {}", e);
            break;
        }
    }

    if let Err(e) = client.close() {
        tracing::debug!("Close failed: {}", e);
    }
    tracing::info!("Event stream ended");
}
