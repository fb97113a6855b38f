//! Flatscout CLI - Command-line interface for the Flatscout daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9531";

#[derive(Parser)]
#[command(name = "flatscout")]
#[command(about = "Flatscout listing scraper CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "FLATSCOUT_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a listing URL for scraping
    Submit {
        /// Listing page URL
        url: String,
    },

    /// Show the stored job for a URL
    Show {
        /// Listing page URL
        url: String,
    },

    /// List all jobs (liked first, newest first)
    List,

    /// Mark a listing as liked
    Like {
        /// Job ID
        id: i64,

        /// Clear the flag instead
        #[arg(long)]
        unset: bool,
    },

    /// Mark a listing as done
    Done {
        /// Job ID
        id: i64,

        /// Clear the flag instead
        #[arg(long)]
        unset: bool,
    },

    /// Delete a listing
    Delete {
        /// Job ID
        id: i64,
    },

    /// Recompute transport times for one listing
    Transport {
        /// Job ID
        job_id: i64,

        /// Street address
        address: String,

        /// Postcode and town (e.g. "8001 Zürich")
        #[arg(short, long)]
        locality: Option<String>,
    },

    /// Recompute transport times for every listing missing them
    TransportAll,

    /// Show system status
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    // `null` is a valid result (e.g. unknown URL)
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct Job {
    id: i64,
    url: String,
    status: String,
    content: String,
    liked: bool,
    done: bool,
    walking_time: Option<String>,
    transit_time: Option<String>,
    cycling_time: Option<String>,
}

#[derive(Tabled)]
struct JobRow {
    id: i64,
    status: String,
    liked: &'static str,
    done: &'static str,
    walking: String,
    transit: String,
    cycling: String,
    url: String,
}

impl From<Job> for JobRow {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            status: job.status,
            liked: mark(job.liked),
            done: mark(job.done),
            walking: or_dash(job.walking_time.as_deref()),
            transit: or_dash(job.transit_time.as_deref()),
            cycling: or_dash(job.cycling_time.as_deref()),
            url: job.url,
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    field: String,
    value: String,
}

fn mark(flag: bool) -> &'static str {
    if flag {
        "✓"
    } else {
        ""
    }
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Rows for a listing object (`{label: value | null}`)
fn field_rows(listing: &Value) -> Vec<FieldRow> {
    listing
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .map(|(field, value)| FieldRow {
                    field: field.clone(),
                    value: or_dash(value.as_str()),
                })
                .collect()
        })
        .unwrap_or_default()
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    Ok(response.result)
}

fn print_transport(result: &Value) {
    let times = &result["transport_times"];
    for (label, mode) in [("Walking:", "walking"), ("Transit:", "transit"), ("Cycling:", "cycling")] {
        println!(
            "  {} {} ({})",
            label.bold(),
            or_dash(times[format!("{}_time", mode)].as_str()),
            or_dash(times[format!("{}_distance", mode)].as_str())
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit { url } => {
            let result = call_rpc(&cli.rpc_url, "listing.submit.v1", json!({ "url": url })).await?;

            match result.get("status").and_then(Value::as_str) {
                Some("pending") if result.as_object().map_or(false, |o| o.len() == 1) => {
                    println!("{}", "✓ Listing accepted, scraping in background".green().bold());
                }
                Some("failed") if result.as_object().map_or(false, |o| o.len() == 1) => {
                    println!("{}", "✗ Scraping this listing failed earlier".red().bold());
                }
                _ => {
                    println!("{}", "✓ Listing already scraped".green().bold());
                    println!();
                    println!("{}", Table::new(field_rows(&result)));
                }
            }
        }

        Commands::Show { url } => {
            let result = call_rpc(&cli.rpc_url, "listing.get.v1", json!({ "url": url })).await?;
            let Some(job) = serde_json::from_value::<Option<Job>>(result)? else {
                println!("{}", format!("No listing stored for {}", url).yellow());
                return Ok(());
            };
            let listing: Value =
                serde_json::from_str(&job.content).context("Stored content is not JSON")?;

            println!("{}", format!("Listing {}", job.id).cyan().bold());
            println!("  {} {}", "URL:".bold(), job.url);
            println!("  {} {}", "Status:".bold(), job.status);
            println!();
            let rows = field_rows(&listing);
            if !rows.is_empty() {
                println!("{}", Table::new(rows));
            }
            println!("  {} {}", "Walking:".bold(), or_dash(job.walking_time.as_deref()));
            println!("  {} {}", "Transit:".bold(), or_dash(job.transit_time.as_deref()));
            println!("  {} {}", "Cycling:".bold(), or_dash(job.cycling_time.as_deref()));
        }

        Commands::List => {
            let result = call_rpc(&cli.rpc_url, "listing.list.v1", json!({})).await?;
            let jobs: Vec<Job> = serde_json::from_value(result)?;

            if jobs.is_empty() {
                println!("{}", "No listings yet".yellow());
            } else {
                let rows: Vec<JobRow> = jobs.into_iter().map(JobRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }

        Commands::Like { id, unset } => {
            let params = json!({ "id": id, "liked": !unset });
            call_rpc(&cli.rpc_url, "listing.like.v1", params).await?;

            let verb = if unset { "unliked" } else { "liked" };
            println!("{}", format!("✓ Listing {} {}", id, verb).green().bold());
        }

        Commands::Done { id, unset } => {
            let params = json!({ "id": id, "done": !unset });
            call_rpc(&cli.rpc_url, "listing.done.v1", params).await?;

            let verb = if unset { "reopened" } else { "marked done" };
            println!("{}", format!("✓ Listing {} {}", id, verb).green().bold());
        }

        Commands::Delete { id } => {
            call_rpc(&cli.rpc_url, "listing.delete.v1", json!({ "id": id })).await?;

            println!("{}", format!("✓ Listing {} deleted", id).green().bold());
        }

        Commands::Transport {
            job_id,
            address,
            locality,
        } => {
            let params = json!({
                "job_id": job_id,
                "address": address,
                "locality": locality,
            });
            let result = call_rpc(&cli.rpc_url, "transport.recompute.v1", params).await?;

            println!(
                "{}",
                format!("✓ Transport times updated for listing {}", job_id)
                    .green()
                    .bold()
            );
            println!();
            print_transport(&result);
            println!(
                "  {} {}",
                "Destination:".bold(),
                or_dash(result["destination"]["address"].as_str())
            );
        }

        Commands::TransportAll => {
            println!("{}", "Recomputing missing transport times...".cyan().bold());
            println!();

            let result = call_rpc(&cli.rpc_url, "transport.recompute_all.v1", json!({})).await?;
            let results = result["results"].as_array().cloned().unwrap_or_default();

            for entry in &results {
                match entry.get("error").and_then(Value::as_str) {
                    Some(error) => println!("  {} #{}: {}", "✗".red(), entry["id"], error),
                    None => println!(
                        "  {} #{} {}",
                        "✓".green(),
                        entry["id"],
                        or_dash(entry["address"].as_str())
                    ),
                }
            }
            println!();
            println!("  {} {}", "Processed:".bold(), result["processed"]);
        }

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Total Jobs:".bold(), stats["total_jobs"]);
                    println!("  {} {}", "Pending:".bold(), stats["pending_jobs"]);
                    println!("  {} {}", "Complete:".bold(), stats["complete_jobs"]);
                    println!("  {} {}", "Failed:".bold(), stats["failed_jobs"]);
                    println!("  {} {}", "In Flight:".bold(), stats["in_flight_units"]);
                    println!();
                    let enrichment = if stats["enrichment_configured"].as_bool().unwrap_or(false) {
                        "ENABLED".green()
                    } else {
                        "DISABLED (GOOGLE_MAPS_API_KEY not set)".yellow()
                    };
                    println!("  {} {}", "Transport:".bold(), enrichment);
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}
