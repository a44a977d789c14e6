// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! netlogger CLI - In-app HTTP Traffic Logger
//!
//! Performs a call through an intercepted host and prints what was captured.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use netlogger::{network_logger, HttpClient, NetworkHost, ReadyStateEvent, ResponseType};

/// How long `xhr` waits for the request object to finish
const XHR_WAIT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("netlogger=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: netlogger fetch <url>");
                return ExitCode::from(1);
            }
            fetch_url(&args[2]).await
        }
        "xhr" => {
            if args.len() < 3 {
                eprintln!("Usage: netlogger xhr <url>");
                return ExitCode::from(1);
            }
            xhr_url(&args[2]).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("netlogger {}", netlogger::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"netlogger - In-app HTTP Traffic Logger

USAGE:
    netlogger <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>     Fetch a URL through the logger and print the captured log
    xhr <url>       Load a URL with a request object and print the captured log
    help            Show this help message
    version         Show version information

EXAMPLES:
    netlogger fetch "https://jsonplaceholder.typicode.com/posts?_limit=5"
    netlogger xhr https://jsonplaceholder.typicode.com/users/1

Set RUST_LOG=netlogger=debug to trace every captured call.
"#
    );
}

fn intercepted_host() -> anyhow::Result<NetworkHost> {
    let client = HttpClient::new().context("failed to create HTTP client")?;
    let host = NetworkHost::from_client(client);
    network_logger().setup_interceptor(&host);
    Ok(host)
}

async fn fetch_url(url: &str) -> anyhow::Result<()> {
    let host = intercepted_host()?;
    println!("Fetching: {}", url);

    // A failed call is still logged; report it and print the log anyway
    match host.fetch(url, None).await {
        Ok(response) => {
            println!("Status: {} {}", response.status_code(), response.status_text);
            println!("Size: {} bytes", response.body_len());
            println!("Time: {}ms", response.response_time_ms);
        }
        Err(e) => println!("Request failed: {}", e),
    }

    print_logs()
}

async fn xhr_url(url: &str) -> anyhow::Result<()> {
    let host = intercepted_host()?;
    println!("Loading: {}", url);

    let (tx, rx) = oneshot::channel::<Result<u16, String>>();
    let done = std::sync::Arc::new(Mutex::new(Some(tx)));

    let mut xhr = host.xml_http_request();
    xhr.set_response_type(ResponseType::Text);
    {
        let done = done.clone();
        xhr.set_on_ready_state_change(Some(Box::new(move |event: &ReadyStateEvent| {
            if event.is_done() {
                if let Some(tx) = done.lock().take() {
                    let _ = tx.send(Ok(event.status));
                }
            }
        })));
    }
    {
        let done = done.clone();
        xhr.set_on_error(Some(Box::new(move |error: &netlogger::Error| {
            if let Some(tx) = done.lock().take() {
                let _ = tx.send(Err(error.to_string()));
            }
        })));
    }

    xhr.open("GET", url)?;
    xhr.send(None)?;

    let outcome = tokio::time::timeout(XHR_WAIT, rx)
        .await
        .map_err(|_| anyhow!("request object did not finish within {:?}", XHR_WAIT))?
        .context("request object dropped its handlers")?;

    match outcome {
        Ok(status) => println!("Status: {}", status),
        // Transport failures never complete the exchange, so nothing is logged
        Err(message) => println!("Request failed: {}", message),
    }

    print_logs()
}

fn print_logs() -> anyhow::Result<()> {
    let logger = network_logger();
    println!("\n=== Captured ({}) ===", logger.log_count());
    for record in logger.logs().iter() {
        println!(
            "  {} {} -> {} ({:.1}ms)",
            record.method(),
            record.url(),
            record.status_label(),
            record.display_duration_ms()
        );
    }

    let json = logger.store().to_json().context("failed to serialize log")?;
    println!("\n{}", json);
    Ok(())
}
