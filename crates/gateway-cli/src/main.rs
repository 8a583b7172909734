//! FerroGateway's management CLI, grounded on `kairos-cli::main`: a clap
//! command tree with `status`/`metrics`/`config validate`/`config generate`
//! subcommands, wired here to `gateway-client` and `gateway-core::config`
//! instead of the teacher's TODO stubs.

use clap::{Arg, Command};
use colored::Colorize;
use gateway_core::config::{Config, ConfigValidator, StrategyConfig, StrategyMode, Target};
use gateway_client::GatewayClient;
use std::collections::HashMap;
use std::process::ExitCode;

fn sample_config() -> Config {
    Config {
        strategy: StrategyConfig { mode: StrategyMode::Single, conditions: Vec::new() },
        targets: vec![Target {
            virtual_key: "openai".to_string(),
            weight: 1.0,
            retry: Some(1),
            circuit_breaker: None,
        }],
        plugins: Vec::new(),
        aliases: HashMap::new(),
    }
}

async fn run_status(url: &str) -> ExitCode {
    println!("checking gateway status at: {}", url.cyan());
    let client = match GatewayClient::new(url) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    match client.health().await {
        Ok(health) => println!("{} {} ({})", "healthy".green().bold(), health.version, health.timestamp),
        Err(err) => {
            eprintln!("{} {err}", "unreachable:".red().bold());
            return ExitCode::FAILURE;
        }
    }

    match client.ready().await {
        Ok(ready) if ready.status == "ready" => {
            println!("{} {} provider(s) registered", "ready".green().bold(), ready.providers_registered);
            ExitCode::SUCCESS
        }
        Ok(ready) => {
            println!("{} {} provider(s) registered", "not ready".yellow().bold(), ready.providers_registered);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run_metrics(url: &str) -> ExitCode {
    println!("fetching registered models from: {}", url.cyan());
    let client = match GatewayClient::new(url) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    match client.models().await {
        Ok(list) => {
            for model in &list.data {
                println!("  {} ({})", model.id.bold(), model.owned_by);
            }
            println!("{} models total", list.data.len());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run_config_validate(file: &str) -> ExitCode {
    println!("validating configuration file: {}", file.cyan());
    let config = match gateway_core::config::load_config(Some(file)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let report = ConfigValidator::validate(&config);
    for warning in &report.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }
    for error in &report.errors {
        eprintln!("{} {error}", "error:".red().bold());
    }

    if report.is_valid() {
        println!("{}", "configuration is valid".green().bold());
        ExitCode::SUCCESS
    } else {
        eprintln!("{} {} error(s)", "invalid:".red().bold(), report.errors.len());
        ExitCode::FAILURE
    }
}

fn run_config_generate(output: &str) -> ExitCode {
    println!("generating sample configuration: {}", output.cyan());
    let config = sample_config();
    let json = match serde_json::to_string_pretty(&config) {
        Ok(json) => json,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };
    match std::fs::write(output, json) {
        Ok(()) => {
            println!("{}", "configuration generated successfully".green().bold());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let matches = Command::new("ferrogateway")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command-line interface for FerroGateway management")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("status").about("Check gateway liveness and readiness").arg(
                Arg::new("url")
                    .short('u')
                    .long("url")
                    .value_name("URL")
                    .help("Gateway base URL")
                    .default_value("http://localhost:8080"),
            ),
        )
        .subcommand(
            Command::new("metrics").about("List the gateway's aggregated models").arg(
                Arg::new("url")
                    .short('u')
                    .long("url")
                    .value_name("URL")
                    .help("Gateway base URL")
                    .default_value("http://localhost:8080"),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Configuration management")
                .subcommand_required(true)
                .subcommand(
                    Command::new("validate").about("Validate a configuration file").arg(
                        Arg::new("file")
                            .short('f')
                            .long("file")
                            .value_name("FILE")
                            .help("Configuration file path")
                            .default_value("gateway.json"),
                    ),
                )
                .subcommand(
                    Command::new("generate").about("Generate a sample configuration").arg(
                        Arg::new("output")
                            .short('o')
                            .long("output")
                            .value_name("FILE")
                            .help("Output file path")
                            .default_value("gateway.json"),
                    ),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("status", sub)) => run_status(sub.get_one::<String>("url").unwrap()).await,
        Some(("metrics", sub)) => run_metrics(sub.get_one::<String>("url").unwrap()).await,
        Some(("config", sub)) => match sub.subcommand() {
            Some(("validate", config_matches)) => run_config_validate(config_matches.get_one::<String>("file").unwrap()),
            Some(("generate", config_matches)) => run_config_generate(config_matches.get_one::<String>("output").unwrap()),
            _ => unreachable!(),
        },
        _ => unreachable!(),
    }
}
