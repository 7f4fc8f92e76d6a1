//! vsmodup - Vintage Story mod updater CLI tool
//!
//! Updates the mods of a Vintage Story installation from mods.vintagestory.at,
//! and can list, export and import installed mods or update itself.

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vsmodup::cli::{CliArgs, Mode};
use vsmodup::config::RunConfig;
use vsmodup::logging::{init_logging, LogLevel};
use vsmodup::modes::{export_mods, import_mods, list_mods, self_update};
use vsmodup::orchestrator::{read_stdin_line, Orchestrator};
use vsmodup::output::{create_formatter, OutputConfig};
use vsmodup::registry::{HttpClient, ModRegistry, VintageStoryRegistry};
use vsmodup::update::UpdateResolver;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(LogLevel::from_flags(args.verbose, args.quiet));

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = RunConfig::load(&args)?;
    let output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    let printer = output_config.status_printer();

    if args.verbose {
        eprintln!("vsmodup v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Mods: {}", config.mod_path.display());
        if config.dry_run {
            eprintln!("Mode: dry-run");
        }
        let ignored: Vec<&str> = config.ignored().collect();
        if !ignored.is_empty() {
            eprintln!("Ignore: {}", ignored.join(", "));
        }
    }

    let client = HttpClient::with_timeout(config.timeout)?;
    let registry: Arc<dyn ModRegistry> = Arc::new(VintageStoryRegistry::new(client));

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    // Status lines go to stderr when stdout carries JSON
    let mut status: Box<dyn Write> = if args.json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };

    let summary = match args.mode() {
        Mode::Version => {
            println!("vsmodup {}", env!("CARGO_PKG_VERSION"));
            return Ok(ExitCode::SUCCESS);
        }
        Mode::List => {
            list_mods(&config.mod_path, &printer, &mut status)?;
            None
        }
        Mode::Export(path) => {
            export_mods(&config.mod_path, &path, &printer, &mut status)?;
            None
        }
        Mode::Import(path) => Some(
            import_mods(
                registry.as_ref(),
                &path,
                &config.mod_path,
                &cancel,
                &printer,
                &mut status,
            )
            .await?,
        ),
        Mode::SelfUpdate => {
            let resolver = UpdateResolver::new(config.pre_release);
            let outcome = self_update(registry.as_ref(), resolver, &printer, &mut status).await?;
            debug!(?outcome, "self-update finished");
            None
        }
        Mode::Update => {
            let mut orchestrator = Orchestrator::new(Arc::clone(&registry), config.clone())
                .with_cancellation(cancel.clone())
                .with_progress(!args.quiet)
                .with_printer(printer);
            Some(orchestrator.run(&mut status).await?)
        }
    };
    status.flush()?;
    drop(status);

    if let Some(summary) = summary {
        let formatter = create_formatter(&output_config);
        let mut stdout = io::stdout().lock();
        formatter.format(&summary, &mut stdout)?;
        stdout.flush()?;
    }

    if config.interactive && !args.json {
        wait_for_enter(&cancel).await;
    }

    Ok(ExitCode::SUCCESS)
}

/// First Ctrl-C stops the run before the next mod, a second one exits
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if cancel.is_cancelled() {
                eprintln!();
                std::process::exit(130);
            }
            warn!("interrupted, stopping after the current mod (press Ctrl-C again to quit)");
            cancel.cancel();
        }
    });
}

/// Keep a double-clicked console window open until Enter is pressed
async fn wait_for_enter(cancel: &CancellationToken) {
    print!("Press Enter to exit");
    if io::stdout().flush().is_err() {
        return;
    }
    tokio::select! {
        _ = read_stdin_line() => {}
        _ = cancel.cancelled() => {}
    }
}
