//! eslink CLI Client
//!
//! Command-line interface for issuing commands to the switch.

use std::collections::HashMap;
use std::io;

use clap::{Parser, Subcommand};
use eslink::config::load_env_file;
use eslink::{Client, Config, EslError};
use tracing_subscriber::{fmt, EnvFilter};

/// eslink CLI
#[derive(Parser, Debug)]
#[command(name = "eslink-cli")]
#[command(about = "CLI for the switch event socket")]
#[command(version)]
struct Args {
    /// Switch address (host[:port])
    #[arg(short, long, env = "ESL_ADDR", default_value = "localhost")]
    addr: String,

    /// Event socket password
    #[arg(short, long, env = "ESL_PASSWORD", default_value = "ClueCon", hide_env_values = true)]
    password: String,

    /// Mirror raw protocol traffic to stderr
    #[arg(long)]
    dump: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an API command and print its output
    Api {
        /// Command and arguments
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },

    /// Run an API command in the background and print the job id
    Job {
        /// Command and arguments
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,
    },

    /// Inject an event
    SendEvent {
        /// Event name
        name: String,

        /// Header as key=value (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Event body
        #[arg(short, long, default_value = "")]
        body: String,
    },

    /// Send a message to a channel
    SendMsg {
        /// Channel uuid
        uuid: String,

        /// Header as key=value (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Message body
        #[arg(short, long, default_value = "")]
        body: String,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

fn run(client: &Client, command: Commands) -> Result<(), EslError> {
    match command {
        Commands::Api { command } => {
            let output = client.api(&command.join(" "))?;
            print!("{output}");
        }
        Commands::Job { command } => {
            println!("{}", client.job(&command.join(" "))?);
        }
        Commands::SendEvent { name, headers, body } => {
            client.send_event(&name, headers.into_iter().collect::<HashMap<_, _>>(), &body)?;
        }
        Commands::SendMsg { uuid, headers, body } => {
            client.send_msg(&uuid, headers.into_iter().collect::<HashMap<_, _>>(), &body)?;
        }
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = load_env_file(".env") {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let args = Args::parse();

    let mut builder = Config::builder();
    if args.dump {
        builder = builder.dump_in(io::stderr()).dump_out(io::stderr());
    }

    let client = match Client::connect(&args.addr, &args.password, builder.build()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to connect to {}: {}", args.addr, e);
            std::process::exit(1);
        }
    };

    let result = run(&client, args.command);
    let _ = client.close();

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
