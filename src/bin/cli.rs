//! respwire CLI Client
//!
//! Sends a single command to a RESP server and prints the reply.

use std::process::ExitCode;

use clap::Parser;
use respwire::protocol::Arg;
use respwire::{Client, Command, Config, Reply, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// respwire CLI
#[derive(Parser, Debug)]
#[command(name = "respwire-cli")]
#[command(about = "Send one command to a RESP server")]
#[command(version)]
struct Args {
    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// Connect attempts before giving up
    #[arg(short, long, default_value = "10")]
    attempts: u32,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,

    /// Command template such as "SET %s %s"; WORDS then fill its %s slots
    #[arg(short, long)]
    template: Option<String>,

    /// Command words, or template arguments when --template is given
    #[arg(required_unless_present = "template")]
    words: Vec<String>,
}

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,respwire=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .connect_attempts(args.attempts)
        .connect_timeout_ms(args.timeout_ms)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    match run(&args, &config) {
        Ok(reply) => {
            println!("{}", reply);
            if reply.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<Reply> {
    let mut client = Client::connect(config)?;
    tracing::info!("Connected to {}", client.peer());

    match &args.template {
        Some(template) => {
            let template_args: Vec<Arg<'_>> = args.words.iter().map(Arg::from).collect();
            client.send(template, &template_args)
        }
        None => client.execute(&Command::from_args(&args.words)),
    }
}
