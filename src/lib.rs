// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod host;
pub mod logging;
pub mod output;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::config::{Settings, load_or_default};
use crate::engine::{BuildController, ControllerOptions, HostEvent, HostLoop, LoopOptions};
use crate::errors::Result;
use crate::host::TerminalHost;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading
/// - the terminal host and the build controller
/// - the host loop (exits when the build finishes)
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut settings = load_or_default(&args.settings)?;
    if let Some(cmd) = args.build_command {
        settings = settings.with_build_command(cmd);
    }
    let options = ControllerOptions::from(&settings);
    info!(
        build_command = %settings.build_command(),
        normalize = ?options.normalize,
        "settings loaded"
    );

    let (tx, rx) = mpsc::unbounded_channel::<HostEvent>();

    let host = TerminalHost::new(Some(PathBuf::from(&args.document)));
    let controller = BuildController::new(host, Arc::new(settings), options, tx.clone());
    let host_loop = HostLoop::new(
        controller,
        rx,
        LoopOptions {
            exit_when_idle: true,
            stop_on_error: true,
        },
    );

    // Ctrl-C → kill the build and stop.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(HostEvent::Shutdown);
        });
    }

    let _ = tx.send(HostEvent::Run { tasks: args.tasks });

    host_loop.run().await?;
    println!();
    Ok(())
}
