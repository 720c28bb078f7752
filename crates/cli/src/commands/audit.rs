//! The audit command: the command-line stand-in for the submission form.
//!
//! Contract source comes from exactly one of `--address` (explorer
//! lookup) or `--file` (local source), with an optional whitepaper
//! document alongside. The command runs one submission to completion and
//! renders the report, or exits nonzero with the failure message.

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Args};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use aegis_auditor::{
    render_report, AuditConfig, AuditState, AuditSubmission, EtherscanClient, GeminiProvider,
    InputMode, Orchestrator, ReportFormat, UploadedFile,
};

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("contract")
        .required(true)
        .args(["address", "file"]),
))]
pub struct AuditArgs {
    /// Contract address to look up on the block explorer
    #[arg(short, long)]
    pub address: Option<String>,

    /// Contract source file to audit instead of an address lookup
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Optional whitepaper document (PDF, DOCX, TXT or MD)
    #[arg(short, long)]
    pub whitepaper: Option<PathBuf>,

    /// Declared MIME type of the whitepaper, when the extension is not enough
    #[arg(long)]
    pub whitepaper_mime: Option<String>,

    #[arg(long, default_value = "text")]
    pub format: ReportFormat,

    /// AI model to use (defaults to configuration)
    #[arg(long)]
    pub model: Option<String>,

    /// AI API key (defaults to AEGIS_API_KEY / GEMINI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Explorer API base URL
    #[arg(long)]
    pub explorer_url: Option<String>,

    /// Explorer API key (the public tier works without one)
    #[arg(long)]
    pub explorer_api_key: Option<String>,

    /// Chain ID for the explorer lookup
    #[arg(long)]
    pub chain_id: Option<u64>,

    /// YAML configuration file (overridden by the flags above)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

fn build_config(args: &AuditArgs) -> Result<AuditConfig> {
    let mut config = match &args.config {
        Some(path) => AuditConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => AuditConfig::from_env(),
    };

    config = config.with_api_key(args.api_key.clone());
    if let Some(ref model) = args.model {
        config.model = model.clone();
    }
    if let Some(ref url) = args.explorer_url {
        config.explorer.base_url = url.clone();
    }
    if let Some(ref key) = args.explorer_api_key {
        config.explorer.api_key = Some(key.clone());
    }
    if let Some(chain_id) = args.chain_id {
        config.explorer.chain_id = chain_id;
    }

    Ok(config)
}

pub async fn execute(args: AuditArgs) -> Result<()> {
    let start = Instant::now();
    let config = build_config(&args)?;

    // Credential check up front, before any request goes out.
    let provider = match GeminiProvider::new(&config) {
        Ok(provider) => provider,
        Err(e) => bail!("{}", e),
    };
    let explorer = EtherscanClient::new(&config.explorer);

    let (mode, address) = match &args.address {
        Some(address) => (InputMode::Address, address.clone()),
        None => (InputMode::File, String::new()),
    };

    let contract_file = args.file.as_ref().map(UploadedFile::from_path);
    let whitepaper = args.whitepaper.as_ref().map(|path| {
        let file = UploadedFile::from_path(path);
        match &args.whitepaper_mime {
            Some(mime) => file.with_mime_type(mime.clone()),
            None => file,
        }
    });

    if args.verbose {
        println!("{}", "🔍 Starting contract audit...".bright_blue());
        match mode {
            InputMode::Address => println!("📍 Address: {}", address),
            InputMode::File => {
                println!("📁 File: {}", args.file.as_ref().unwrap().display())
            }
        }
        if let Some(ref wp) = args.whitepaper {
            println!("📄 Whitepaper: {}", wp.display());
        }
    }

    let mut orchestrator = Orchestrator::new(&explorer, &provider, config.temperature);
    let state = orchestrator
        .submit(AuditSubmission {
            mode,
            address,
            contract_file,
            whitepaper,
        })
        .await
        .clone();

    match state {
        AuditState::Success(result) => {
            let report = render_report(&result, args.format)?;
            match args.output {
                Some(path) => {
                    std::fs::write(&path, report)
                        .with_context(|| format!("Failed to write report to {:?}", path))?;
                    println!("Report written to {}", path.display());
                }
                None => println!("{}", report),
            }

            if args.verbose {
                println!(
                    "\n{} in {:.2}s",
                    "✅ Audit complete".green().bold(),
                    start.elapsed().as_secs_f64()
                );
            }
            Ok(())
        }
        AuditState::Failed(message) => {
            eprintln!("{} {}", "❌ Audit failed:".red().bold(), message);
            bail!("{}", message)
        }
        other => bail!("Unexpected final state: {:?}", other),
    }
}
