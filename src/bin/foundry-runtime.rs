//! # Foundry Runtime
//!
//! Container entry point. The adapter and handler come from configuration,
//! so one image serves every hosting backend.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the default component over REST on 0.0.0.0:8000
//! foundry-runtime serve
//!
//! # Serve a different component to a functions host
//! HANDLER=components.text_processor:predict foundry-runtime serve --adapter functions
//!
//! # Score mini-batch files offline
//! foundry-runtime batch --output scored.jsonl part-0.jsonl part-1.jsonl
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use foundry_runtime::adapters::BatchAdapter;
use foundry_runtime::logging::init_structured_logging;
use foundry_runtime::{AdapterKind, FoundryRuntime, HealthState, RuntimeConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "foundry-runtime")]
#[command(about = "Serve one predict() component to any hosting backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Handler reference (`<module>:<callable>`), overrides HANDLER
    #[arg(long, global = true)]
    handler: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the configured adapter over HTTP
    Serve {
        /// Adapter to serve (rest, functions, batch, action)
        #[arg(short, long)]
        adapter: Option<AdapterKind>,
        /// Bind address, e.g. 0.0.0.0:8000
        #[arg(short, long)]
        bind: Option<String>,
        /// Resolve the handler on the first request instead of at startup
        #[arg(long)]
        lazy: bool,
    },
    /// Score mini-batch files and write JSON Lines output
    Batch {
        /// Output file (JSON Lines)
        #[arg(short, long)]
        output: PathBuf,
        /// Input files, processed in order
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print the health report without resolving the handler
    Health,
    /// List registered components
    Components,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = RuntimeConfig::from_env().context("failed to load configuration")?;
    if let Some(handler) = cli.handler {
        config.handler = handler;
    }
    if let Commands::Serve {
        adapter,
        bind,
        lazy,
    } = &cli.command
    {
        if let Some(adapter) = adapter {
            config.adapter = *adapter;
        }
        if let Some(bind) = bind {
            config.bind_address = bind.clone();
        }
        if *lazy {
            config.eager_resolve = false;
        }
        config.validate().context("invalid configuration")?;
    }

    init_structured_logging(&config.environment, config.log_format);
    let runtime = FoundryRuntime::with_builtin_components(config);

    match cli.command {
        Commands::Serve { .. } => serve(runtime).await,
        Commands::Batch { output, inputs } => run_batch(runtime, output, inputs).await,
        Commands::Health => Ok(print_health(&runtime)),
        Commands::Components => Ok(list_components(&runtime)),
    }
}

async fn serve(runtime: FoundryRuntime) -> anyhow::Result<ExitCode> {
    info!("Starting Foundry Runtime");
    info!("   Version: {}", env!("CARGO_PKG_VERSION"));
    info!("   Adapter: {}", runtime.config().adapter);
    info!("   Handler: {}", runtime.config().handler);
    info!(
        "   Resolution: {}",
        if runtime.config().eager_resolve {
            "eager"
        } else {
            "lazy"
        }
    );

    if let Err(e) = runtime.serve(foundry_runtime::web::shutdown_signal()).await {
        error!(error = %e, "Runtime stopped with an error");
        return Err(e).context("runtime failed");
    }

    info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}

async fn run_batch(
    runtime: FoundryRuntime,
    output: PathBuf,
    inputs: Vec<PathBuf>,
) -> anyhow::Result<ExitCode> {
    runtime.start().await.context("handler resolution failed")?;

    runtime.register_output_check(&output);
    let report = runtime.health().report(Some(AdapterKind::Batch));
    if report.status == HealthState::Degraded {
        let reason = report.reason.unwrap_or_default();
        error!(output = %output.display(), %reason, "Batch output is not writable");
        anyhow::bail!("cannot write batch output: {reason}");
    }

    let adapter = BatchAdapter::new(runtime.adapter_runtime());
    let outputs = adapter.run_files(&inputs).await;
    let failed = outputs.iter().filter(|output| !output.is_success()).count();

    let rows: Vec<_> = outputs.into_iter().flat_map(|output| output.into_rows()).collect();
    let written = BatchAdapter::write_rows(&output, &rows)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(files = inputs.len(), rows = written, output = %output.display(), "Batch complete");
    if failed > 0 {
        warn!(failed, "Some mini-batches failed; failure records were written in their place");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_health(runtime: &FoundryRuntime) -> ExitCode {
    let report = runtime.health().report(Some(runtime.config().adapter));
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{text}"),
        Err(e) => error!(error = %e, "Failed to render health report"),
    }

    if report.status == HealthState::Degraded {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn list_components(runtime: &FoundryRuntime) -> ExitCode {
    let registry = runtime.registry();
    let active = runtime.config().handler.as_str();

    for reference in registry.references() {
        let marker = if reference == active { "*" } else { " " };
        let description = foundry_runtime::HandlerReference::parse(&reference)
            .ok()
            .and_then(|parsed| registry.lookup(&parsed).ok().map(|r| r.info.description.clone()))
            .unwrap_or_default();
        println!("{marker} {reference:<40} {description}");
    }
    ExitCode::SUCCESS
}
