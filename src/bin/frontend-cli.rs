use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "frontend-cli")]
#[command(about = "Client for the HotROD frontend", long_about = None)]
struct Cli {
    /// Base URL of the frontend, including any base path.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the landing page
    Index,
    /// Request a car for a customer
    Dispatch {
        /// Customer identifier
        customer: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let index = index_url(&cli.url)?;
    let base = index.as_str().trim_end_matches('/');

    match cli.command {
        Commands::Index => {
            let res = client.get(index.clone()).send().await?;
            print_text(res).await?;
        }
        Commands::Dispatch { customer } => {
            let res = client
                .post(format!("{}/dispatch", base))
                .form(&[("customer", customer.as_str())])
                .send()
                .await?;
            print_json(res).await?;
        }
    }

    Ok(())
}

/// Index route of the frontend: the root itself, or the base path without a trailing slash.
fn index_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;
    if url.path() != "/" {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }
    Ok(url)
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: frontend returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }
    println!("{}", text);
    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: frontend returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
