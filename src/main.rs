// src/main.rs
use std::path::PathBuf;
use std::process::exit;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use torscout::capture::ChromiumCapturer;
use torscout::config::ScanConfig;
use torscout::engine::Scanner;
use torscout::fetch::ProxiedFetcher;
use torscout::report::ReportWriter;
use torscout::target::load_targets;

#[derive(Parser)]
#[command(name = "torscout")]
#[command(about = "Batch scanner for proxied onion services: fetch, title, screenshot, report")]
struct Args {
    /// Target list file: one address per line, `#` comments allowed
    #[arg(required_unless_present = "init_config")]
    targets: Option<PathBuf>,

    #[arg(long, help = "Write the effective configuration to ~/.torscout/config.toml and exit")]
    init_config: bool,

    #[arg(long, short, help = "Configuration file")]
    config: Option<PathBuf>,

    #[arg(long, help = "SOCKS5 proxy endpoint (host:port)")]
    proxy: Option<String>,

    #[arg(long, short, help = "Root output directory")]
    output: Option<PathBuf>,

    #[arg(long, help = "Report file path")]
    report: Option<PathBuf>,

    #[arg(long, short = 'j', help = "Maximum concurrent scans (0 = one per CPU)")]
    concurrent: Option<usize>,

    #[arg(long, help = "Enable debug logging")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match ScanConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            exit(1);
        }
    };

    // CLI flags override the configuration file.
    if let Some(proxy) = args.proxy {
        config.proxy_addr = proxy;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(report) = args.report {
        config.report_file = report;
    }
    if let Some(concurrent) = args.concurrent {
        config.max_concurrent_scans = concurrent;
    }

    if args.init_config {
        let path = torscout::config::loader::get_default_config_path();
        config.save(&path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let targets_path = match args.targets {
        Some(path) => path,
        None => {
            error!("No target list supplied");
            exit(1);
        }
    };

    let targets = load_targets(&targets_path)?;
    if targets.is_empty() {
        println!("No targets found in {}", targets_path.display());
        return Ok(());
    }
    info!(
        "Loaded {} targets, proxying through {}",
        targets.len(),
        config.proxy_addr
    );

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let report = Arc::new(ReportWriter::open(&config.report_file)?);
    let fetcher = Arc::new(ProxiedFetcher::new(&config)?);
    let capturer = Arc::new(ChromiumCapturer::new(&config));

    let scanner = Scanner::new(Arc::new(config), fetcher, capturer, report);
    let outcomes = scanner.run(&targets).await;

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    println!(
        "All scans completed: {}/{} succeeded",
        succeeded,
        outcomes.len()
    );

    Ok(())
}
