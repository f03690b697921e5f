use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::{Value, json};

use oac_client::{Client, NoValidation};
use oac_core::registry::OperationRegistry;
use oac_core::spec;

#[derive(Parser)]
#[command(name = "oac", about = "Dynamic OpenAPI client", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the operations declared in a spec
    Inspect {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: OutputFormat,
    },

    /// Invoke one operation and print the response body
    Call {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// operationId (snake_case accepted)
        operation: String,

        /// Positional path arguments, in placeholder order
        args: Vec<String>,

        /// Query parameter (repeatable)
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,

        /// Extra request header (repeatable)
        #[arg(long = "header", value_name = "KEY=VALUE")]
        header: Vec<String>,

        /// JSON request body
        #[arg(long = "json")]
        json_body: Option<String>,

        /// Server URL override
        #[arg(long)]
        server: Option<String>,

        /// Skip request/response schema validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input, format } => cmd_inspect(&input, format),

        Commands::Call {
            input,
            operation,
            args,
            query,
            header,
            json_body,
            server,
            no_validate,
        } => cmd_call(
            &input, &operation, args, &query, &header, json_body, server, no_validate,
        ),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "oac", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn cmd_inspect(input: &PathBuf, format: OutputFormat) -> Result<()> {
    let tree = spec::from_file(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let registry = OperationRegistry::collect(&tree)?;

    let rows: Vec<Value> = registry
        .iter()
        .map(|(id, op)| {
            json!({
                "operationId": id,
                "method": op.method().to_uppercase(),
                "path": op.path(),
                "summary": op.summary(),
            })
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(&rows)?),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_call(
    input: &PathBuf,
    operation: &str,
    args: Vec<String>,
    query: &[String],
    header: &[String],
    json_body: Option<String>,
    server: Option<String>,
    no_validate: bool,
) -> Result<()> {
    let mut builder = Client::from_file(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    if let Some(server) = server {
        builder = builder.server_url(server);
    }
    for pair in header {
        let (name, value) = split_pair(pair)?;
        builder = builder.header(name, value);
    }
    if no_validate {
        builder = builder.validator(NoValidation);
    }
    let mut client = builder.build()?;

    let mut call = client.call(operation).path_args(args);
    for pair in query {
        let (name, value) = split_pair(pair)?;
        call = call.query(name, value);
    }
    if let Some(body) = json_body {
        let body: Value = serde_json::from_str(&body).context("invalid JSON in --json")?;
        call = call.body(body);
    }

    let response = call.send()?;
    match response.json() {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", response.text()),
    }
    Ok(())
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .ok_or_else(|| anyhow!("invalid format: {pair} (expected key=value)"))
}
