use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "config-cli")]
#[command(about = "Client for the remote configuration server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "development-auth-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the files resolved for an app version
    Lookup {
        /// App version, e.g. 1.2.0
        version: String,
    },
    /// Ask the server to reload its configuration document
    Refresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    // The server compares the raw header value, no scheme prefix
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&cli.key)?);

    match cli.command {
        Commands::Lookup { version } => {
            let res = client
                .get(format!("{}/config/{}", base, version))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Refresh => {
            let res = client
                .get(format!("{}/config/refresh", base))
                .headers(headers)
                .send()
                .await?;
            let status = res.status();
            if status.is_success() {
                println!("Configuration refreshed");
            } else {
                eprintln!("Error: refresh returned status {}", status);
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
