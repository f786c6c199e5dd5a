use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use volume_check::server::message_param;
use volume_check::snapshot::{compare, Snapshot, DEFAULT_SNAPSHOT_FILE};

#[derive(Parser)]
#[command(name = "volcheck")]
#[command(about = "Check that a storage volume survives a redeploy", long_about = None)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "VOLCHECK_URL",
        default_value = "http://localhost:5000",
        help = "Base URL of the running app"
    )]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show the current health counts")]
    Health,

    #[command(about = "Create a user (sqlite-app only)")]
    AddUser {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Email address")]
        email: String,
    },

    #[command(about = "Upload a file (file-app only)")]
    Upload {
        #[arg(short, long, help = "Path to the file")]
        file: PathBuf,
    },

    #[command(about = "Save the current counts before redeploying")]
    Snapshot {
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_FILE, help = "Snapshot file")]
        output: PathBuf,
    },

    #[command(about = "Compare the current counts with a saved snapshot")]
    Verify {
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_FILE, help = "Snapshot file")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let url = cli.url.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Health => show_health(&url).await,
        Commands::AddUser { username, email } => add_user(&url, &username, &email).await,
        Commands::Upload { file } => upload_file(&url, &file).await,
        Commands::Snapshot { output } => take_snapshot(&url, &output).await,
        Commands::Verify { input } => verify(&url, &input).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Failed to build HTTP client")
}

async fn fetch_health(url: &str) -> Result<BTreeMap<String, Value>> {
    let response = client()?
        .get(format!("{}/health", url))
        .send()
        .await
        .context("Failed to connect to the app. Is it running?")?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        bail!("Health check failed: {}", error_text);
    }

    response.json().await.context("Failed to parse health response")
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn show_health(url: &str) -> Result<()> {
    let health = fetch_health(url).await?;

    println!("\n🩺 Health of {}\n", url);
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("Field"), Cell::new("Value")]));
    for (key, value) in &health {
        table.add_row(Row::new(vec![Cell::new(key), Cell::new(&display(value))]));
    }
    table.printstd();
    println!();

    Ok(())
}

/// The apps answer writes with a redirect to `/?message=...`.
fn redirect_message(response: &reqwest::Response) -> Result<String> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| anyhow::anyhow!("Unexpected response: {}", response.status()))?;

    let query = location.split_once('?').map(|(_, q)| q);
    Ok(message_param(query).unwrap_or_default())
}

async fn add_user(url: &str, username: &str, email: &str) -> Result<()> {
    let response = client()?
        .post(format!("{}/add_user", url))
        .form(&[("username", username), ("email", email)])
        .send()
        .await
        .context("Failed to connect to the app. Is it running?")?;

    let message = redirect_message(&response)?;
    if message.contains("created successfully") {
        println!("✅ {}", message);
        Ok(())
    } else {
        bail!("{}", message)
    }
}

async fn upload_file(url: &str, path: &Path) -> Result<()> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("File not found: {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    let form = Form::new().part("file", Part::bytes(data).file_name(filename));
    let response = client()?
        .post(format!("{}/upload", url))
        .multipart(form)
        .send()
        .await
        .context("Failed to connect to the app. Is it running?")?;

    let message = redirect_message(&response)?;
    if message.contains("uploaded successfully") {
        println!("✅ {}", message);
        Ok(())
    } else {
        bail!("{}", message)
    }
}

async fn take_snapshot(url: &str, output: &Path) -> Result<()> {
    let health = fetch_health(url).await?;
    let snapshot = Snapshot::new(url, health);
    snapshot.save(output)?;

    println!("📸 Snapshot saved to {}", output.display());
    for (key, value) in &snapshot.health {
        println!("   {}: {}", key, display(value));
    }
    println!("\n💡 Redeploy, then run 'volcheck verify' to compare");

    Ok(())
}

async fn verify(url: &str, input: &Path) -> Result<()> {
    let snapshot = Snapshot::load(input)?;
    let current = fetch_health(url).await?;
    let checks = compare(&snapshot.health, &current);

    println!(
        "\n🔍 Comparing with snapshot from {}\n",
        snapshot.taken_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z")
    );

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Field"),
        Cell::new("Before"),
        Cell::new("After"),
        Cell::new("Result"),
    ]));
    for check in &checks {
        table.add_row(Row::new(vec![
            Cell::new(&check.key),
            Cell::new(&display(&check.before)),
            Cell::new(&display(&check.after)),
            Cell::new(if check.passed { "✅" } else { "❌" }),
        ]));
    }
    table.printstd();
    println!();

    let failed = checks.iter().filter(|c| !c.passed).count();
    if failed > 0 {
        bail!("{} check(s) regressed: data did not persist", failed);
    }
    println!("✅ Data persisted across the redeploy");
    Ok(())
}
