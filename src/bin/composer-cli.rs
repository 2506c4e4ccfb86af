use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "composer-cli")]
#[command(about = "Management CLI for the proxy configuration composer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "COMPOSER_API_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version, revision and subscriber count
    Status,
    /// Print the current composed configuration
    Config,
    /// Print every feature fragment in precedence order
    Features,
    /// Submit new params for one feature
    Update {
        /// Feature id, e.g. stealthProMax
        feature: String,
        /// JSON file holding the params object
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Run an advisory helper, e.g. network-health
    Advise {
        advisor: String,
        /// JSON file holding the advisor input
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn read_json(path: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request: RequestBuilder = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Config => client.get(format!("{}/admin/config", cli.url)),
        Commands::Features => client.get(format!("{}/admin/features", cli.url)),
        Commands::Update { feature, file } => client
            .put(format!("{}/admin/features/{feature}", cli.url))
            .json(&read_json(&file)?),
        Commands::Advise { advisor, file } => client
            .post(format!("{}/admin/advisory/{advisor}", cli.url))
            .json(&read_json(&file)?),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if let Some(revision) = res.headers().get("x-config-revision") {
        eprintln!("revision: {}", revision.to_str().unwrap_or("?"));
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
