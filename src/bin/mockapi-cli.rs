use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "mockapi-cli")]
#[command(about = "Management CLI for the mock API server", long_about = None)]
struct Cli {
    /// Base URL of the admin API.
    #[arg(short, long, default_value = "http://localhost:5000/api")]
    url: String,

    /// API key, if the server requires one.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status,
    /// List all endpoint definitions
    List,
    /// Show one endpoint definition
    Get { id: String },
    /// Create an endpoint definition
    Create(EndpointArgs),
    /// Replace an endpoint definition
    Update {
        id: String,
        #[command(flatten)]
        endpoint: EndpointArgs,
    },
    /// Delete an endpoint definition
    Delete { id: String },
}

#[derive(Args)]
struct EndpointArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Path template, e.g. /users/:id
    #[arg(short, long)]
    path: String,

    /// Status code to respond with
    #[arg(short, long, default_value_t = 200)]
    status: u16,

    /// Response body text
    #[arg(short, long, default_value = "{}", conflicts_with = "response_file")]
    response: String,

    /// Read the response body from a file
    #[arg(long)]
    response_file: Option<PathBuf>,

    /// JSON schema the request body must satisfy
    #[arg(long, default_value = "")]
    rule: String,

    /// Read the validation rule from a file
    #[arg(long, conflicts_with = "rule")]
    rule_file: Option<PathBuf>,
}

impl EndpointArgs {
    fn to_json(&self) -> Result<Value, std::io::Error> {
        let response = match &self.response_file {
            Some(path) => std::fs::read_to_string(path)?,
            None => self.response.clone(),
        };
        let rule = match &self.rule_file {
            Some(path) => std::fs::read_to_string(path)?,
            None => self.rule.clone(),
        };

        Ok(json!({
            "method": self.method.to_uppercase(),
            "pathTemplate": self.path,
            "validationRule": rule,
            "responseBody": response,
            "statusCode": self.status,
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let base = cli.url.trim_end_matches('/');
    let request = match &cli.command {
        Commands::Status => client.get(format!("{}/status", base)),
        Commands::List => client.get(format!("{}/endpoints", base)),
        Commands::Get { id } => client.get(format!("{}/endpoints/{}", base, id)),
        Commands::Create(endpoint) => client
            .post(format!("{}/endpoints", base))
            .json(&endpoint.to_json()?),
        Commands::Update { id, endpoint } => client
            .put(format!("{}/endpoints/{}", base, id))
            .json(&endpoint.to_json()?),
        Commands::Delete { id } => client.delete(format!("{}/endpoints/{}", base, id)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
