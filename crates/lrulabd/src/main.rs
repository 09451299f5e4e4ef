//! lrulab daemon - RESP server and playground runner for the LRU cache

mod demo;
mod handler;
mod resp;

use anyhow::{bail, Result};
use bytes::BytesMut;
use clap::Parser;
use lrulab::SharedCache;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

use crate::handler::CommandHandler;
use crate::resp::RespValue;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    bind: String,

    /// Cache capacity (number of entries, must be positive)
    #[arg(short, long, default_value_t = 1024, allow_negative_numbers = true)]
    capacity: i64,

    /// Run the built-in playground scenarios and exit
    #[arg(long)]
    demo: bool,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.health {
        match TcpStream::connect(&args.bind).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    if args.demo {
        return run_demo();
    }

    info!("Starting lrulab daemon v{}", env!("CARGO_PKG_VERSION"));

    let cache = Arc::new(SharedCache::new(args.capacity)?);
    info!("Cache capacity: {}", cache.capacity());

    let listener = TcpListener::bind(&args.bind).await?;
    info!("Server listening on {}", args.bind);
    println!("redis-cli -p {} PUT 1 1", listener.local_addr()?.port());

    serve(listener, cache).await
}

fn run_demo() -> Result<()> {
    let reports = demo::run_all()?;
    let mut failed = 0;

    for report in &reports {
        let status = if report.passed { "ok" } else { "FAILED" };
        println!("== {} [{}]", report.name, status);
        for line in &report.lines {
            println!("   {}", line);
        }
        if !report.passed {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} scenarios failed", failed, reports.len());
    }
    Ok(())
}

async fn serve(listener: TcpListener, cache: Arc<SharedCache>) -> Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cache = Arc::clone(&cache);

                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, cache).await {
                        error!("Error handling client {}: {}", addr, e);
                    }
                    info!("Connection closed: {}", addr);
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(mut stream: TcpStream, cache: Arc<SharedCache>) -> Result<()> {
    let handler = CommandHandler::new(cache);
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        let n = stream.read_buf(&mut buffer).await?;
        if n == 0 {
            return Ok(());
        }

        // A single read may carry several pipelined commands
        loop {
            match RespValue::parse(&mut buffer) {
                Ok(Some(cmd)) => {
                    let response = handler.handle(cmd);
                    stream.write_all(&response.serialize()).await?;
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Parse error: {}", e);
                    let error_resp = RespValue::error(format!("ERR {}", e));
                    stream.write_all(&error_resp.serialize()).await?;
                    buffer.clear();
                    break;
                }
            }
        }
    }
}
