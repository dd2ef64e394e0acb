//! Command-line interface for minerview-agent.
//!
//! This binary talks to a running agent daemon over its HTTP API.

use std::env;

use anyhow::Result;

use minerview_agent::api_client;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: minerview-cli <command> [args]");
        eprintln!();
        eprintln!("Commands:");
        eprintln!("  query <ip>    Fetch normalized telemetry for a device");
        eprintln!("  health        Check that the agent is running");
        eprintln!();
        eprintln!("Environment:");
        eprintln!("  MINERVIEW_API_URL    API base URL (default: http://127.0.0.1:5001)");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "query" => {
            let Some(ip) = args.get(2) else {
                eprintln!("Usage: minerview-cli query <ip>");
                std::process::exit(1);
            };
            cmd_query(ip).await?;
        }
        "health" => cmd_health().await?,
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Build an API client, honoring MINERVIEW_API_URL if set.
fn make_client() -> api_client::Client {
    match env::var("MINERVIEW_API_URL") {
        Ok(url) => api_client::Client::with_base_url(url),
        Err(_) => api_client::Client::new(),
    }
}

/// Print a summary of one device's normalized telemetry.
async fn cmd_query(ip: &str) -> Result<()> {
    let client = make_client();
    let response = client.query(ip).await?;
    let record = response.data;

    println!("Address:      {}", record.ip.as_deref().unwrap_or(ip));
    println!(
        "Model:        {} {}",
        record.make.as_deref().unwrap_or("-"),
        record.model.as_deref().unwrap_or("")
    );
    if let Some(firmware) = &record.firmware {
        println!("Firmware:     {}", firmware);
    }
    if let Some(rate) = record.hashrate_avg {
        println!("Hashrate:     {}", rate);
    }
    if let Some(temp) = record.temperature {
        println!("Temperature:  {} C", temp);
    }
    if let Some(power) = record.power_usage {
        println!("Power:        {} W", power);
    }
    println!("Primary pool: {}", record.primary_pool);
    for pool in &record.pools {
        println!(
            "  - {} ({})",
            pool.url.as_deref().unwrap_or("-"),
            pool.status.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Check agent liveness.
async fn cmd_health() -> Result<()> {
    let client = make_client();
    println!("{}", client.health().await?);
    Ok(())
}
