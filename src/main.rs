//! Secure Fabric CLI
//!
//! Operator tool over the library: key check, seal / open, and a policy
//! dry-run of the trust evaluator. Tokens and JSON go to stdout, logs to
//! stderr.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use secure_fabric::constants::{APP_NAME, APP_VERSION, DEFAULT_LOG_FILTER, ENV_BLOCK_POLICY};
use secure_fabric::logic::trust::FnProbe;
use secure_fabric::{
    Config, EnvelopeError, PlatformContext, PolicyConfig, ProbeError, ProbeSet, Record, ThreatSignal,
    TrustEvaluator,
};

#[derive(Parser)]
#[command(author, version, about = "Envelope codec and device trust evaluator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the configured envelope key is a valid 256-bit key
    CheckKey,

    /// Seal a JSON object (stdin or --input) into a token
    Seal {
        /// Read the JSON object from this file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Open a token and print the record as JSON
    Open {
        token: String,
    },

    /// Dry-run the trust evaluator with fixed probe outcomes
    Evaluate {
        /// Signal reported as detected: root, debug, instrumentation, integrity
        #[arg(long = "flag", value_parser = parse_signal)]
        flags: Vec<ThreatSignal>,

        /// Make the integrity probe fail with this message
        #[arg(long)]
        fail: Option<String>,

        /// Block policy preset (overrides SECURE_FABRIC_BLOCK_POLICY)
        #[arg(long)]
        policy: Option<String>,
    },
}

fn parse_signal(name: &str) -> Result<ThreatSignal, String> {
    ThreatSignal::parse(name).ok_or_else(|| format!("unknown signal '{}'", name))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    log::debug!("{} v{} starting with {:?}", APP_NAME, APP_VERSION, config);

    match cli.command {
        Commands::CheckKey => check_key(&config),
        Commands::Seal { input } => seal(&config, input),
        Commands::Open { token } => open(&config, &token),
        Commands::Evaluate { flags, fail, policy } => evaluate(&config, flags, fail, policy),
    }
}

fn check_key(config: &Config) -> Result<()> {
    let key = config.key_material()?;
    if !key.is_valid() {
        bail!(
            "envelope key is invalid ({})",
            key.len()
                .map(|len| format!("{} bytes", len))
                .unwrap_or_else(|| "not base64".to_string())
        );
    }

    println!(
        "ok: 256-bit key, fingerprint {}",
        key.fingerprint().unwrap_or_default()
    );
    Ok(())
}

fn seal(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let text = match input {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };

    let json: serde_json::Value = serde_json::from_str(&text).context("input is not JSON")?;
    let record = Record::from_json_value(json)?;
    let token = config
        .envelope_codec()?
        .seal(&record)
        .map_err(|e| report_envelope_error("seal", e))?;

    println!("{}", token);
    Ok(())
}

fn open(config: &Config, token: &str) -> Result<()> {
    let record = config
        .envelope_codec()?
        .open(token.trim())
        .map_err(|e| report_envelope_error("open", e))?;
    let json = record.to_json_value()?;

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn report_envelope_error(operation: &str, err: EnvelopeError) -> EnvelopeError {
    log::warn!("{} rejected ({} failure)", operation, err.kind());
    err
}

fn evaluate(
    config: &Config,
    flags: Vec<ThreatSignal>,
    fail: Option<String>,
    policy: Option<String>,
) -> Result<()> {
    let policy = match policy {
        Some(name) => PolicyConfig::from_name(&name)
            .with_context(|| format!("unknown policy '{}'", name))?,
        None => config
            .block_policy()
            .with_context(|| format!("reading {}", ENV_BLOCK_POLICY))?,
    };

    let mut probes = ProbeSet::fixed(flags);
    if let Some(message) = fail {
        probes = probes.with_probe(
            ThreatSignal::Integrity,
            FnProbe::new("simulated_failure", move |_ctx: &PlatformContext| {
                Err(ProbeError::Failed(message.clone()))
            }),
        );
    }

    let verdict = TrustEvaluator::new(probes)
        .with_policy(policy)
        .evaluate(&PlatformContext::default());

    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}
