//! # 1C OData CLI
//!
//! Command-line utilities for checking entity paths and keys and for
//! fetching data from a published infobase.

use anyhow::{bail, Context, Result};
use onec_odata_client::{guid, resolve, Connection};
use std::env;
use tracing_subscriber::EnvFilter;

mod config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "resolve" => {
            if args.len() < 3 {
                eprintln!("Usage: onec-odata resolve <path>");
                std::process::exit(1);
            }
            let name = resolve(&args[2]).context("Failed to resolve entity path")?;
            println!("{}", name.wire_name());
        }
        "guid" => {
            if args.len() < 3 {
                eprintln!("Usage: onec-odata guid <value>");
                std::process::exit(1);
            }
            if guid::is_valid(Some(&args[2])) {
                println!("valid");
            } else {
                println!("invalid");
                std::process::exit(1);
            }
        }
        "get" => {
            if args.len() < 3 {
                eprintln!("Usage: onec-odata get <path> [guid]");
                std::process::exit(1);
            }
            get(&args[2], args.get(3).map(String::as_str)).await?;
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn get(path: &str, key: Option<&str>) -> Result<()> {
    let config = config::from_env()?;
    tracing::info!(base_url = %config.base_url, path, "Fetching");

    let mut connection =
        Connection::from_config(&config).context("Failed to create connection")?;
    let container = connection
        .container(path)
        .context("Failed to resolve entity path")?;

    match container.get(key).await? {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        None => bail!(
            "request failed: {} {} (1C error {}: {})",
            container.response_code().unwrap_or_default(),
            container.response_phrase().unwrap_or_default(),
            container.error_code().unwrap_or_default(),
            container.error_message().unwrap_or_default(),
        ),
    }
}

fn print_help() {
    println!(
        r#"1C OData CLI

USAGE:
    onec-odata <COMMAND> [OPTIONS]

COMMANDS:
    resolve <path>        Print the OData entity set name for a path
    guid <value>          Check whether a value is a well-formed key
    get <path> [guid]     Fetch an entity set, or one entity by key
    help                  Show this help message

ENVIRONMENT:
    ONEC_ODATA_URL, ONEC_ODATA_USERNAME, ONEC_ODATA_PASSWORD,
    ONEC_ODATA_PROXY (host:port), ONEC_ODATA_PROXY_SECURED,
    ONEC_ODATA_TIMEOUT_SECS

EXAMPLES:
    onec-odata resolve "Справочник/Номенклатура"
    onec-odata get "Справочник/Номенклатура"
"#
    );
}
