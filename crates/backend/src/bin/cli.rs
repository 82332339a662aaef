use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use shared_types::{
    ApiStatusResponse, HealthResponse, PlantActionResponse, PlantResponse, PlantStatusResponse,
    PlantTimerResponse,
};

#[derive(Parser)]
#[command(name = "watered-cli")]
#[command(about = "CLI for checking on the plant via the backend API")]
#[command(
    long_about = "A command-line interface for a running watered server.\n\n\
    Shows the plant's health, its watering timer and the server's status.\n\
    With a session token it can also record a watering."
)]
struct Cli {
    /// Backend server URL to connect to.
    ///
    /// Use this to connect to a remote server or a different port.
    #[arg(
        short,
        long,
        default_value = "http://localhost:8080",
        env = "WATERED_API_URL"
    )]
    base_url: String,

    /// Value of the `watered_session` cookie, for commands that need a login.
    ///
    /// Copy it from the browser after signing in.
    #[arg(long, env = "WATERED_SESSION", hide_env_values = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or water the plant
    Plant {
        #[command(subcommand)]
        action: PlantAction,
    },
    /// Check that the server is alive
    Health,
    /// Show server version and uptime
    Status,
}

#[derive(Subcommand)]
enum PlantAction {
    /// Full plant record with derived health fields
    Show,
    /// Health status and time since the last watering
    Status,
    /// Watering timer: last watering, interval and next due time
    Timer,
    /// Record a watering as the signed-in user
    ///
    /// Requires --session (or WATERED_SESSION).
    Water,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = cli.base_url.trim_end_matches('/');

    match cli.command {
        Commands::Plant { action } => {
            handle_plant(&client, base_url, cli.session.as_deref(), action).await?
        }
        Commands::Health => {
            let health: HealthResponse =
                read_json(client.get(format!("{}/health", base_url)).send().await?).await?;
            println!("{}: {}", health.service, health.status);
        }
        Commands::Status => {
            let status: ApiStatusResponse =
                read_json(client.get(format!("{}/api/status", base_url)).send().await?).await?;
            println!("{} v{} ({})", status.service, status.version, status.status);
            println!("    Up for {}", status.uptime_formatted);
        }
    }

    Ok(())
}

async fn handle_plant(
    client: &Client,
    base_url: &str,
    session: Option<&str>,
    action: PlantAction,
) -> anyhow::Result<()> {
    let url = format!("{}/api/plant", base_url);

    match action {
        PlantAction::Show => {
            let plant: PlantResponse = read_json(client.get(&url).send().await?).await?;
            print_plant(&plant);
        }
        PlantAction::Status => {
            let status: PlantStatusResponse =
                read_json(client.get(format!("{}/status", url)).send().await?).await?;
            println!("Status: {}", status.status);
            println!("    Last watered: {}", status.time_since_watering_formatted);
            if status.is_overdue {
                println!("    Overdue!");
            } else if let Some(secs) = status.time_until_due {
                println!("    Due in {}", format_seconds(secs));
            }
        }
        PlantAction::Timer => {
            let timer: PlantTimerResponse =
                read_json(client.get(format!("{}/timer", url)).send().await?).await?;
            println!("Interval: every {} hours", timer.timeout_hours);
            match timer.last_watered {
                Some(at) => println!("    Last watered: {}", at.to_rfc3339()),
                None => println!("    Never watered"),
            }
            if let Some(next) = timer.next_watering_time {
                println!("    Next watering: {}", next.to_rfc3339());
            }
            if timer.is_overdue {
                println!("    Overdue!");
            }
        }
        PlantAction::Water => {
            let session = session.context("Watering requires --session or WATERED_SESSION")?;
            let response = client
                .post(format!("{}/water", url))
                .header(header::COOKIE, format!("watered_session={}", session))
                .send()
                .await?;
            let result: PlantActionResponse = read_json(response).await?;
            println!("{}", result.message);
            print_plant(&result.plant);
        }
    }

    Ok(())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Request failed: {} {}", status, body);
    }
    response.json().await.context("Invalid response body")
}

fn print_plant(plant: &PlantResponse) {
    println!("{} [{}]", plant.name, plant.health_status);
    println!("    Last watered: {}", plant.time_since_watering);
    if !plant.watered_by.is_empty() {
        println!("    Watered by: {}", plant.watered_by);
    }
    println!("    Interval: every {} hours", plant.timeout_hours);
}

/// Whole hours and minutes, e.g. `5h 03m`.
fn format_seconds(secs: i64) -> String {
    let minutes = secs.max(0) / 60;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
