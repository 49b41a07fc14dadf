use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use common::config::Settings;
use remediation::commands;
use remediation::dialect::Dialect;
use remediation::services::RemediationService;
use remediation::synthesizer::FixScriptSynthesizer;
use std::path::Path;
use std::process;
use tracing::{error, info};

const DEFAULT_CONFIG: &str = "config/remediation.toml";

fn cli() -> Command {
    Command::new("Data Quality Remediation")
        .version("1.0")
        .about("Classifies data-quality issues and generates SQL fix scripts")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Sets a custom config file"),
        )
        .subcommand(
            Command::new("script")
                .about("Render fix scripts for the columns in a JSON file")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .required(true)
                        .help("JSON file with the asset's columns"),
                )
                .arg(
                    Arg::new("asset")
                        .short('a')
                        .long("asset")
                        .value_name("NAME")
                        .required(true)
                        .help("Table the columns belong to"),
                )
                .arg(Arg::new("schema").long("schema").value_name("SCHEMA"))
                .arg(
                    Arg::new("dialect")
                        .short('d')
                        .long("dialect")
                        .value_name("DATABASE")
                        .help("postgresql, sqlserver or mysql"),
                )
                .arg(
                    Arg::new("column")
                        .long("column")
                        .value_name("NAME")
                        .help("Only render fixes for this column"),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify every issue in a JSON column file")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("fetch")
                .about("Fetch an asset's columns from the catalog and render fix scripts")
                .arg(
                    Arg::new("asset-id")
                        .long("asset-id")
                        .value_name("ID")
                        .required(true),
                )
                .arg(Arg::new("schema").long("schema").value_name("SCHEMA"))
                .arg(
                    Arg::new("dialect")
                        .short('d')
                        .long("dialect")
                        .value_name("DATABASE"),
                ),
        )
        .subcommand(Command::new("serve").about("Run the remediation HTTP API"))
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_CONFIG);

    let settings = match Settings::new(config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load config {}: {}", config_path, e);
            process::exit(1);
        }
    };
    common::logging::init(&settings.logging);

    if let Err(e) = run(&matches, settings).await {
        error!(error = %format!("{:#}", e), "Command failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(matches: &ArgMatches, settings: Settings) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("script", args)) => {
            let input = required(args, "input")?;
            let columns = commands::load_columns(Path::new(input))
                .with_context(|| format!("reading columns from {}", input))?;

            let synth = synthesizer(&settings, required(args, "asset")?, args);
            let script = commands::render_scripts(
                &synth,
                &columns,
                args.get_one::<String>("column").map(String::as_str),
            )?;
            println!("{}", script);
        }
        Some(("classify", args)) => {
            let input = required(args, "input")?;
            let columns = commands::load_columns(Path::new(input))
                .with_context(|| format!("reading columns from {}", input))?;
            let classifications = commands::classify_columns(&columns);
            println!("{}", serde_json::to_string_pretty(&classifications)?);
        }
        Some(("fetch", args)) => {
            let service = RemediationService::from_settings(settings)?;
            let script = service
                .asset_batch_script(
                    required(args, "asset-id")?,
                    args.get_one::<String>("schema").map(String::as_str),
                    args.get_one::<String>("dialect").map(String::as_str),
                )
                .await?;
            println!("{}", script);
        }
        Some(("serve", _)) => {
            info!(host = %settings.server.host, port = settings.server.port, "Starting remediation API");
            remediation::serve(settings).await?;
        }
        _ => {
            anyhow::bail!("No subcommand specified. Use --help for usage information.");
        }
    }
    Ok(())
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing --{}", name))
}

fn synthesizer(settings: &Settings, asset: &str, args: &ArgMatches) -> FixScriptSynthesizer {
    let dialect = args
        .get_one::<String>("dialect")
        .map(String::as_str)
        .unwrap_or(&settings.synthesis.default_dialect);
    let schema = args
        .get_one::<String>("schema")
        .map(String::as_str)
        .unwrap_or(&settings.synthesis.default_schema);
    FixScriptSynthesizer::new(asset, Some(schema), Dialect::detect(dialect))
}
