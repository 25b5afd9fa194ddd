// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::io::Read;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use polyrun::config::{load_and_validate_config, Config};
use polyrun::protocol::ExecutionRequest;
use polyrun::service::ExecutionService;

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [--config <config.yaml>] <request.json>\n\
         \n\
         Reads an execution request from the given JSON file (or stdin when\n\
         the path is '-') and prints the result envelope as JSON.\n\
         \n\
         Example request:\n\
         {{\"code\": \"console.log('hi'); 1 + 1\", \"language\": \"javascript\"}}"
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<String> = None;
    let mut request_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(
                    args.get(i)
                        .cloned()
                        .context("--config requires a file path")?,
                );
            }
            path => request_path = Some(path.to_string()),
        }
        i += 1;
    }

    let Some(request_path) = request_path else {
        eprintln!("{}", usage(&args[0]));
        std::process::exit(1);
    };

    let config = match config_path {
        Some(path) => load_and_validate_config(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => Config::default().apply_env(),
    };

    let raw_request = if request_path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read request from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&request_path)
            .with_context(|| format!("failed to read request from {request_path}"))?
    };

    let request: ExecutionRequest =
        serde_json::from_str(&raw_request).context("invalid execution request JSON")?;

    let service = ExecutionService::from_config(&config);
    let result = service.execute(&request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
