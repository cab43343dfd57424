// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! netlogger CLI
//!
//! Runs requests through the logging pipeline and evaluates filter
//! expressions against saved records.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use netlogger::{
    FilterExpression, MemorySink, NetworkLogger, NetworkLoggerConfig, NetworkRecord, Platform,
    SinkPayload,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("netlogger=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: netlogger fetch <url> [--platform ios|android] [--filter <expr>] [--config <file>]");
                return ExitCode::from(1);
            }
            match FetchOptions::parse(&args[3..]) {
                Ok(options) => fetch_url(&args[2], options).await,
                Err(e) => {
                    eprintln!("{}", e);
                    ExitCode::from(1)
                }
            }
        }
        "filter" => {
            if args.len() < 4 {
                eprintln!("Usage: netlogger filter <expr> <record.json>");
                return ExitCode::from(1);
            }
            check_filter(&args[2], &args[3])
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("netlogger {}", netlogger::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"netlogger - Network logging bridge

USAGE:
    netlogger <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>                 Fetch a URL through the logger and show what the sink received
    filter <expr> <record.json> Check whether a filter expression drops a saved record
    help                        Show this help message
    version                     Show version information

FETCH OPTIONS:
    --platform <ios|android>    Payload convention (default: build target)
    --filter <expr>             Drop records the expression is truthy for
    --config <file>             Load logger configuration from a JSON file

EXAMPLES:
    netlogger fetch https://example.com --platform android
    netlogger fetch https://example.com --filter "network.responseCode === 200"
    netlogger filter "network.url.includes('health')" record.json
"#
    );
}

struct FetchOptions {
    config: NetworkLoggerConfig,
}

impl FetchOptions {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut config = NetworkLoggerConfig::default();
        let mut platform = None;
        let mut filter = None;

        let mut iter = args.iter();
        while let Some(flag) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .ok_or_else(|| format!("Missing value for {}", flag))
            };
            match flag.as_str() {
                "--platform" => {
                    platform = Some(value()?.parse::<Platform>().map_err(|e| e.to_string())?)
                }
                "--filter" => filter = Some(value()?),
                "--config" => {
                    config = NetworkLoggerConfig::from_file(value()?).map_err(|e| e.to_string())?
                }
                other => return Err(format!("Unknown option: {}", other)),
            }
        }

        // Flags override the config file
        if let Some(platform) = platform {
            config.platform = platform;
        }
        if let Some(expression) = filter {
            FilterExpression::with_binding(&expression, &config.filter_binding)
                .map_err(|e| e.to_string())?;
            config.filter_expression = Some(expression);
        }

        Ok(Self { config })
    }
}

async fn fetch_url(url: &str, options: FetchOptions) -> ExitCode {
    println!("Fetching: {} (platform: {})", url, options.config.platform);

    let sink = MemorySink::new("core");
    let logger = match NetworkLogger::from_config(options.config, Arc::new(sink.clone())) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            return ExitCode::from(1);
        }
    };
    logger.set_enabled(true);

    let outcome = logger.interceptor().get(url).await;
    match &outcome {
        Ok(response) => {
            println!("\n=== Response ===");
            println!("Status: {}", response.status);
            println!("Content-Type: {:?}", response.content_type());
            println!("Size: {} bytes", response.body_len());
            println!("Time: {}ms", response.response_time_ms);
        }
        Err(e) => eprintln!("Request failed: {}", e),
    }

    let payloads = sink.payloads();
    if payloads.is_empty() {
        println!("\n[FILTERED] No record reached the sink");
    }
    for payload in &payloads {
        println!("\n=== Sink payload ===");
        match payload {
            SinkPayload::Structured(value) => match serde_json::to_string_pretty(value) {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("Failed to render payload: {}", e),
            },
            SinkPayload::Encoded(text) => println!("{}", text),
        }
    }

    let report = logger.metrics();
    println!(
        "\nSummary: {} captured, {} filtered, {} dispatched",
        report.records_captured, report.records_filtered, report.records_dispatched
    );

    if outcome.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn check_filter(expression: &str, path: &str) -> ExitCode {
    let filter = match FilterExpression::parse(expression) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let record: NetworkRecord = match std::fs::read_to_string(path)
        .map_err(netlogger::Error::from)
        .and_then(|text| serde_json::from_str(&text).map_err(netlogger::Error::from))
    {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to read record {}: {}", path, e);
            return ExitCode::from(1);
        }
    };

    match filter.matches(&record) {
        Ok(true) => {
            println!("[DROP] {} {}", record.method, record.url);
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!("[KEEP] {} {}", record.method, record.url);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("[KEEP] {} {} (evaluation failed: {})", record.method, record.url, e);
            ExitCode::from(2)
        }
    }
}
